use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::sim_params::SimParams;
use std::path::Path;

// Arena geometry
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
    /// Interior wall segments as `[x1, y1, x2, y2]`.
    #[serde(default)]
    pub obstacles: Vec<[f64; 4]>,
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub dt: f64,
    pub total_time: f64,
    pub record_interval: f64,
}

// Initial conditions, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InitialConditions {
    pub num_particles: u32,
    pub max_speed: f64,
    pub seed: u64,
}

// Wall response parameters
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BounceConfig {
    #[serde(default = "default_restitution")]
    pub restitution: f64,
    #[serde(default = "default_friction")]
    pub friction: f64,
    /// Speed cap applied after every bounce (0 = no cap).
    #[serde(default)]
    pub max_speed: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PoolConfig {
    /// Slots put on the freelist before the first frame.
    #[serde(default = "default_prewarm")]
    pub prewarm: usize,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_positions: bool,
    pub save_stats: bool,
    #[serde(default)]
    pub save_positions_in_snapshot: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

// Main configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub arena: ArenaConfig,
    pub timing: TimingConfig,
    pub initial_conditions: InitialConditions,
    #[serde(default)]
    pub bounce: BounceConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    pub output: OutputConfig,
}

impl Default for BounceConfig {
    fn default() -> Self {
        BounceConfig {
            restitution: default_restitution(),
            friction: default_friction(),
            max_speed: 0.0,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig { prewarm: default_prewarm() }
    }
}

impl SimulationConfig {
    /// Loads the configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !is_positive(self.arena.width) || !is_positive(self.arena.height) {
            anyhow::bail!("arena width and height must be positive and finite.");
        }
        if !is_positive(self.timing.dt) {
            anyhow::bail!("dt must be positive and finite.");
        }
        if !self.timing.total_time.is_finite() || !self.timing.record_interval.is_finite() {
            anyhow::bail!("total_time and record_interval must be finite.");
        }
        if self.initial_conditions.num_particles == 0 {
            anyhow::bail!("num_particles must be greater than 0.");
        }
        if !is_non_negative(self.initial_conditions.max_speed) || !is_non_negative(self.bounce.max_speed) {
            anyhow::bail!("max_speed must not be negative.");
        }
        if !(0.0..=1.0).contains(&self.bounce.restitution) {
            anyhow::bail!("restitution must be within [0, 1], got {}.", self.bounce.restitution);
        }
        if !(0.0..=1.0).contains(&self.bounce.friction) {
            anyhow::bail!("friction must be within [0, 1], got {}.", self.bounce.friction);
        }
        for (i, [x1, y1, x2, y2]) in self.arena.obstacles.iter().enumerate() {
            if [x1, y1, x2, y2].iter().any(|c| !c.is_finite()) {
                anyhow::bail!("obstacle {} has non-finite coordinates.", i);
            }
            if x1 == x2 && y1 == y2 {
                anyhow::bail!("obstacle {} has zero length.", i);
            }
        }
        Ok(())
    }

    /// Converts the configuration into parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let dt = self.timing.dt;
        let total_steps = (self.timing.total_time / dt).ceil().max(0.0) as u32;
        // Record at least every step
        let record_interval_steps = (self.timing.record_interval.max(0.0) / dt).round().max(1.0) as u32;

        SimParams {
            width: self.arena.width,
            height: self.arena.height,
            dt,
            time_step: 0,
            total_steps,
            record_interval_steps,
            restitution: self.bounce.restitution,
            friction: self.bounce.friction,
            max_speed: if self.bounce.max_speed > 0.0 { self.bounce.max_speed } else { f64::INFINITY },
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn default_restitution() -> f64 {
    0.8 // 1.0 is a perfect mirror, 0.0 kills the normal component
}

fn default_friction() -> f64 {
    0.1 // Fraction of tangential speed lost per bounce
}

fn default_prewarm() -> usize {
    64
}
