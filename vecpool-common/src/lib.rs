pub mod config;
pub mod coord;
pub mod geometry;
pub mod ops;
pub mod pool;
pub mod sim_params;
pub mod snapshot;
pub mod vector;

// Re-export key types for easier use by dependent crates
pub use config::{SimulationConfig, ArenaConfig, TimingConfig, InitialConditions, BounceConfig, PoolConfig, OutputConfig};
pub use coord::{CoordinatePair, angle_to_pair};
pub use pool::{Pool, PoolStats};
pub use sim_params::SimParams;
pub use snapshot::Snapshot;
pub use vector::{Lifetime, LifetimeMode, Operand, Stable, Transient, Vector, EPSILON, EPSILON_SQUARED};
