use crate::arena::{build_walls, first_hit, Wall};
use crate::particle_state::ParticleState;
use anyhow::Result;
use log::{debug, info, trace, warn};
use vecpool_common::{pool, SimParams, SimulationConfig, Snapshot, Stable, Vector};

/// Wall contacts resolved per particle per step before the rest of the move
/// is dropped.
const MAX_CONTACTS_PER_STEP: u32 = 4;
/// Distance a particle is pushed off a wall after touching it.
const CONTACT_OFFSET: f64 = 1e-6;

/// Particles bouncing inside a walled arena, all vector math on pooled vectors.
pub struct ArenaSimulation {
    config: SimulationConfig,
    state: ParticleState,
    walls: Vec<Wall>,
    current_time_step: u32,
    bounces_since_record: u32,
    /// Pool size after the first step; the pool should not grow past it.
    warm_pool_size: Option<usize>,
    recorded_snapshots: Vec<Snapshot>,
}

impl ArenaSimulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let state = ParticleState::new(&config)?;
        let walls = build_walls(&config.arena);
        info!("Built arena with {} walls ({} obstacles).", walls.len(), config.arena.obstacles.len());

        Ok(Self {
            config,
            state,
            walls,
            current_time_step: 0,
            bounces_since_record: 0,
            warm_pool_size: None,
            recorded_snapshots: Vec::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn params(&self) -> &SimParams {
        &self.state.params
    }

    pub fn current_particle_count(&self) -> u32 {
        self.state.count()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time_step as f64 * self.state.params.dt
    }

    /// Advances every particle by one `dt`, resolving wall contacts.
    pub fn step(&mut self) -> Result<()> {
        let params = &self.state.params;
        let (dt, restitution, friction, max_speed) = (params.dt, params.restitution, params.friction, params.max_speed);

        let mut bounces = 0;
        for particle in self.state.particles.iter_mut() {
            bounces += advance_particle(
                &mut particle.position,
                &mut particle.velocity,
                &self.walls,
                dt,
                restitution,
                friction,
                max_speed,
            );
        }
        self.bounces_since_record += bounces;
        self.current_time_step += 1;
        self.state.params.time_step = self.current_time_step;
        trace!("Step {} resolved {} wall contacts.", self.current_time_step, bounces);

        let allocated = pool::stats().allocated;
        match self.warm_pool_size {
            None => self.warm_pool_size = Some(allocated),
            Some(warm) if allocated > warm => {
                warn!("Coordinate pool grew from {} to {} slots at step {}.", warm, allocated, self.current_time_step);
                self.warm_pool_size = Some(allocated);
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Records the current state and pool counters.
    pub fn record_snapshot(&mut self) -> Result<()> {
        let time = self.current_time();
        debug!("Recording snapshot at {:.3}...", time);

        let invalid_particles = self.state.invalid_count();
        if invalid_particles > 0 {
            warn!("{} particles have non-finite coordinates at {:.3}.", invalid_particles, time);
        }
        let positions = if self.config.output.save_positions_in_snapshot {
            Some(self.state.positions())
        } else {
            None
        };

        self.recorded_snapshots.push(Snapshot {
            time,
            particle_count: self.state.count(),
            mean_speed: self.state.mean_speed(),
            bounces: self.bounces_since_record,
            invalid_particles,
            pool: pool::stats(),
            positions,
        });
        self.bounces_since_record = 0;
        Ok(())
    }

    pub fn get_recorded_snapshots(&self) -> &[Snapshot] {
        &self.recorded_snapshots
    }

    /// Final particle positions.
    pub fn get_results(&self) -> Vec<(f64, f64)> {
        self.state.positions()
    }
}

/// Moves one particle through `dt`, reflecting its velocity off every wall it
/// reaches on the way. Returns the number of contacts.
fn advance_particle(
    position: &mut Vector<Stable>,
    velocity: &mut Vector<Stable>,
    walls: &[Wall],
    dt: f64,
    restitution: f64,
    friction: f64,
    max_speed: f64,
) -> u32 {
    let mut remaining = dt;
    let mut step = Vector::stable(0.0, 0.0);
    let mut contacts = 0;

    while contacts < MAX_CONTACTS_PER_STEP {
        step.copy_from(&*velocity * remaining);
        let Some(contact) = first_hit(walls, position, &step) else {
            position.add_vector(&step);
            return contacts;
        };

        let wall = &walls[contact.wall];
        let travelled = position.dist(contact.point) / step.length();
        let facing = wall.normal_facing(position);
        position.copy_from(contact.point).add_vector(facing * CONTACT_OFFSET);

        // `friction` is the share of tangential speed lost at the wall.
        velocity
            .bounce_with_friction(&wall.normal, restitution, 1.0 - friction)
            .truncate(max_speed);
        remaining *= 1.0 - travelled;
        contacts += 1;
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config(restitution: f64, friction: f64) -> SimulationConfig {
        let toml = format!(
            r#"
            [arena]
            width = 10.0
            height = 10.0

            [timing]
            dt = 0.1
            total_time = 5.0
            record_interval = 0.5

            [initial_conditions]
            num_particles = 8
            max_speed = 30.0
            seed = 42

            [bounce]
            restitution = {restitution:?}
            friction = {friction:?}

            [output]
            base_filename = "test"
            save_positions = false
            save_stats = false
            save_positions_in_snapshot = true
            "#
        );
        SimulationConfig::from_toml_str(&toml).unwrap()
    }

    #[test]
    fn elastic_bounce_off_right_wall() {
        let walls = build_walls(&config(1.0, 0.0).arena);
        let mut position = Vector::stable(9.5, 5.0);
        let mut velocity = Vector::stable(10.0, 0.0);
        let contacts = advance_particle(&mut position, &mut velocity, &walls, 0.1, 1.0, 0.0, f64::INFINITY);
        assert_eq!(contacts, 1);
        assert_abs_diff_eq!(velocity.x(), -10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(velocity.y(), 0.0, epsilon = 1e-9);
        // 0.5 to the wall, 0.5 back
        assert_abs_diff_eq!(position.x(), 9.5, epsilon = 1e-5);
        assert_abs_diff_eq!(position.y(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn friction_and_restitution_damp_the_bounce() {
        let walls = build_walls(&config(0.5, 0.5).arena);
        let mut position = Vector::stable(5.0, 0.5);
        let mut velocity = Vector::stable(4.0, -10.0);
        advance_particle(&mut position, &mut velocity, &walls, 0.1, 0.5, 0.5, f64::INFINITY);
        assert_abs_diff_eq!(velocity.x(), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(velocity.y(), 5.0, epsilon = 1e-9);
        assert!(position.y() > 0.0);
    }

    #[test]
    fn friction_is_the_tangential_share_lost() {
        let walls = build_walls(&config(1.0, 0.25).arena);
        let mut position = Vector::stable(5.0, 0.5);
        let mut velocity = Vector::stable(4.0, -10.0);
        advance_particle(&mut position, &mut velocity, &walls, 0.1, 1.0, 0.25, f64::INFINITY);
        assert_abs_diff_eq!(velocity.x(), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(velocity.y(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn speed_cap_applies_after_bounce() {
        let walls = build_walls(&config(1.0, 0.0).arena);
        let mut position = Vector::stable(9.9, 5.0);
        let mut velocity = Vector::stable(20.0, 0.0);
        advance_particle(&mut position, &mut velocity, &walls, 0.01, 1.0, 0.0, 5.0);
        assert_abs_diff_eq!(velocity.length(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn particles_stay_inside_and_keep_speed_when_elastic() {
        let mut sim = ArenaSimulation::new(config(1.0, 0.0)).unwrap();
        let initial_speed = sim.state.mean_speed();
        for _ in 0..sim.params().total_steps {
            sim.step().unwrap();
        }
        for (x, y) in sim.get_results() {
            assert!((0.0..=10.0).contains(&x) && (0.0..=10.0).contains(&y), "escaped to ({x}, {y})");
        }
        assert_abs_diff_eq!(sim.state.mean_speed(), initial_speed, epsilon = 1e-6);
    }

    #[test]
    fn pool_stops_growing_after_first_step() {
        let mut sim = ArenaSimulation::new(config(0.9, 0.2)).unwrap();
        sim.step().unwrap();
        let warm = pool::stats().allocated;
        for _ in 0..20 {
            sim.step().unwrap();
        }
        assert_eq!(pool::stats().allocated, warm);
        // two stable vectors per particle plus three per wall
        assert_eq!(pool::stats().live, 8 * 2 + 4 * 3);
    }

    #[test]
    fn snapshots_record_pool_and_positions() {
        let mut sim = ArenaSimulation::new(config(1.0, 0.0)).unwrap();
        sim.record_snapshot().unwrap();
        for _ in 0..5 {
            sim.step().unwrap();
        }
        sim.record_snapshot().unwrap();

        let snapshots = sim.get_recorded_snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].time, 0.0);
        assert_abs_diff_eq!(snapshots[1].time, 0.5, epsilon = 1e-12);
        assert_eq!(snapshots[1].particle_count, 8);
        assert_eq!(snapshots[1].invalid_particles, 0);
        assert_eq!(snapshots[1].positions.as_ref().map(Vec::len), Some(8));
        assert_eq!(snapshots[1].pool.live, 8 * 2 + 4 * 3);
    }
}
