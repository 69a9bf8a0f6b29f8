use serde::{Deserialize, Serialize};

/// Runtime parameters derived from the configuration, read every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // Arena
    pub width: f64,
    pub height: f64,

    // Time
    pub dt: f64,
    pub time_step: u32, // Current frame number
    pub total_steps: u32,
    pub record_interval_steps: u32,

    // Wall response
    pub restitution: f64,
    pub friction: f64,
    pub max_speed: f64, // Infinite when uncapped
}
