use crate::pool::PoolStats;
use serde::{Serialize, Deserialize};

/// State of the arena and of the coordinate pool at one recorded frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation time at which the snapshot was taken.
    pub time: f64,
    pub particle_count: u32,
    /// Mean particle speed.
    pub mean_speed: f64,
    /// Wall contacts resolved since the previous snapshot.
    pub bounces: u32,
    /// Particles whose coordinates turned NaN or infinite.
    pub invalid_particles: u32,
    pub pool: PoolStats,
    /// Written even when `None`; bincode is not self-describing and cannot
    /// skip a missing field on read.
    pub positions: Option<Vec<(f64, f64)>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(positions: Option<Vec<(f64, f64)>>) -> Snapshot {
        Snapshot {
            time: 1.5,
            particle_count: 2,
            mean_speed: 3.0,
            bounces: 4,
            invalid_particles: 0,
            pool: PoolStats { allocated: 10, free: 6, live: 4 },
            positions,
        }
    }

    #[test]
    fn bincode_reads_back_snapshots_without_positions() {
        let snapshots = vec![snapshot(None), snapshot(Some(vec![(1.0, 2.0), (3.0, 4.0)]))];
        let bytes = bincode::serialize(&snapshots).unwrap();
        let decoded: Vec<Snapshot> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].positions.is_none());
        assert_eq!(decoded[1].positions, Some(vec![(1.0, 2.0), (3.0, 4.0)]));
        assert_eq!(decoded[1].pool, snapshots[1].pool);
    }
}
