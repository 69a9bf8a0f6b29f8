use anyhow::Result;
use rand::distr::Uniform;
use rand::prelude::*;
use rand_distr::UnitCircle;
use vecpool_common::{SimParams, SimulationConfig, Stable, Vector};

/// One moving point. Both vectors are held for the whole run.
#[derive(Debug)]
pub struct Particle {
    pub position: Vector<Stable>,
    pub velocity: Vector<Stable>,
}

/// Holds the particles and the runtime parameters.
#[derive(Debug)]
pub struct ParticleState {
    pub params: SimParams,
    pub particles: Vec<Particle>,
}

impl ParticleState {
    /// Scatters `num_particles` uniformly over the arena with random headings
    /// and speeds up to `max_speed`.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let params = config.get_sim_params();
        let initial = &config.initial_conditions;
        let mut rng = StdRng::seed_from_u64(initial.seed);

        let x_dist = Uniform::new(0.0, params.width)?;
        let y_dist = Uniform::new(0.0, params.height)?;
        let speed_dist = Uniform::new_inclusive(0.0, initial.max_speed)?;

        let mut state = Self { params, particles: Vec::with_capacity(initial.num_particles as usize) };
        for _ in 0..initial.num_particles {
            let [dx, dy]: [f64; 2] = rng.sample(UnitCircle);
            let speed = rng.sample(speed_dist);
            state.add_particle(rng.sample(x_dist), rng.sample(y_dist), dx * speed, dy * speed);
        }
        Ok(state)
    }

    pub fn add_particle(&mut self, x: f64, y: f64, vx: f64, vy: f64) {
        self.particles.push(Particle {
            position: Vector::stable(x, y),
            velocity: Vector::stable(vx, vy),
        });
    }

    pub fn count(&self) -> u32 {
        self.particles.len() as u32
    }

    pub fn mean_speed(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        let total: f64 = self.particles.iter().map(|p| p.velocity.length()).sum();
        total / self.particles.len() as f64
    }

    /// Particles with a NaN or infinite position or velocity.
    pub fn invalid_count(&self) -> u32 {
        self.particles
            .iter()
            .filter(|p| !p.position.is_valid() || !p.velocity.is_valid())
            .count() as u32
    }

    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.particles.iter().map(|p| p.position.coords().into()).collect()
    }
}
