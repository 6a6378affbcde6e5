//! Configuration loading and typed config structures for the N-body server.
//!
//! The configuration lives in `nbody-config.yaml` next to the binary's
//! working directory. Every key is optional; omitted keys take the
//! reference values (one attractor of mass 5e5 at the origin, 1500
//! particles on a 50..300 ring, `G = 0.1`, `dt = 0.05`, a 15 ms step
//! cadence).

use std::path::Path;

use nbody_physics::{PhysicsParams, Vec3};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `nbody-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NBodyConfig {
    /// Physical constants and time step.
    #[serde(default)]
    pub physics: PhysicsParams,

    /// Initial world layout (attractors and particle ring).
    #[serde(default)]
    pub world: WorldConfig,

    /// Background stepper cadence.
    #[serde(default)]
    pub stepper: StepperConfig,

    /// Per-observer broadcast settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Parameters for bodies created by observer commands.
    #[serde(default)]
    pub spawn: SpawnConfig,

    /// Async runtime sizing.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Listen address.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NBodyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `NBODY_HOST` and `NBODY_PORT` override the network section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.network.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if world.ring_min_radius.is_nan() || world.ring_min_radius <= 0.0 {
            return Err(invalid("world.ring_min_radius must be positive"));
        }
        if world.ring_max_radius.is_nan() || world.ring_max_radius < world.ring_min_radius {
            return Err(invalid(
                "world.ring_max_radius must be at least world.ring_min_radius",
            ));
        }
        if self.stepper.step_interval_ms == 0 {
            return Err(invalid("stepper.step_interval_ms must be at least 1"));
        }
        if self.runtime.worker_threads == 0 {
            return Err(invalid("runtime.worker_threads must be at least 1"));
        }
        if self.broadcast.outbound_buffer == 0 {
            return Err(invalid("broadcast.outbound_buffer must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// One attractor placed at initialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttractorConfig {
    /// Designated (pinned) position.
    #[serde(default)]
    pub position: Vec3,

    /// Attractor mass.
    #[serde(default = "default_attractor_mass")]
    pub mass: f64,
}

impl Default for AttractorConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            mass: default_attractor_mass(),
        }
    }
}

/// Initial world layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Number of particles seeded on the ring.
    #[serde(default = "default_particle_count")]
    pub particle_count: u32,

    /// Inner ring radius.
    #[serde(default = "default_ring_min_radius")]
    pub ring_min_radius: f64,

    /// Outer ring radius.
    #[serde(default = "default_ring_max_radius")]
    pub ring_max_radius: f64,

    /// Mass of each seeded particle.
    #[serde(default = "default_particle_mass")]
    pub particle_mass: f64,

    /// Seed for the ring layout. `None` draws from the OS on every reset.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Attractors placed before the ring, in order.
    #[serde(default = "default_attractors")]
    pub attractors: Vec<AttractorConfig>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            particle_count: default_particle_count(),
            ring_min_radius: default_ring_min_radius(),
            ring_max_radius: default_ring_max_radius(),
            particle_mass: default_particle_mass(),
            seed: None,
            attractors: default_attractors(),
        }
    }
}

/// Background stepper cadence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepperConfig {
    /// Wall-clock milliseconds between steps.
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: default_step_interval_ms(),
        }
    }
}

/// Per-observer broadcast settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    /// Frames buffered per observer between the scheduler and the socket
    /// writer.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

/// Parameters for bodies created by `createBodies` commands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawnConfig {
    /// Mass given to spawned attractors.
    #[serde(default = "default_attractor_mass")]
    pub attractor_mass: f64,

    /// Mass given to spawned particles.
    #[serde(default = "default_particle_mass")]
    pub particle_mass: f64,

    /// Velocity components are drawn from `[-velocity_range, velocity_range]`.
    /// `None` reuses the command's position `range`.
    #[serde(default)]
    pub velocity_range: Option<f64>,

    /// Largest `count` a single command may request.
    #[serde(default = "default_max_batch")]
    pub max_batch: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            attractor_mass: default_attractor_mass(),
            particle_mass: default_particle_mass(),
            velocity_range: None,
            max_batch: default_max_batch(),
        }
    }
}

/// Async runtime sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeConfig {
    /// Worker threads shared by the stepper and every observer task.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
        }
    }
}

/// Listen address for the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl NetworkConfig {
    /// Override the bind address with `NBODY_HOST` / `NBODY_PORT` when set.
    ///
    /// An unparseable port is ignored and the configured one kept.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NBODY_HOST") {
            self.host = val;
        }
        if let Some(port) = std::env::var("NBODY_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.port = port;
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_attractor_mass() -> f64 {
    5e5
}

const fn default_particle_count() -> u32 {
    1500
}

const fn default_ring_min_radius() -> f64 {
    50.0
}

const fn default_ring_max_radius() -> f64 {
    300.0
}

const fn default_particle_mass() -> f64 {
    1.0
}

fn default_attractors() -> Vec<AttractorConfig> {
    vec![AttractorConfig::default()]
}

const fn default_step_interval_ms() -> u64 {
    15
}

const fn default_outbound_buffer() -> usize {
    8
}

const fn default_max_batch() -> u32 {
    10_000
}

const fn default_worker_threads() -> usize {
    10
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = NBodyConfig::default();
        assert_eq!(config.world.particle_count, 1500);
        assert_eq!(config.world.ring_min_radius, 50.0);
        assert_eq!(config.world.ring_max_radius, 300.0);
        assert_eq!(config.world.attractors.len(), 1);
        assert_eq!(config.world.attractors[0].mass, 5e5);
        assert_eq!(config.world.attractors[0].position, Vec3::ZERO);
        assert_eq!(config.stepper.step_interval_ms, 15);
        assert_eq!(config.runtime.worker_threads, 10);
        assert_eq!(config.spawn.velocity_range, None);
        assert_eq!(config.spawn.max_batch, 10_000);
        assert_eq!(config.physics, PhysicsParams::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config: NBodyConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, NBodyConfig::default());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let yaml = include_str!("../../../nbody-config.yaml");
        let config: NBodyConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config, NBodyConfig::default());
    }

    #[test]
    fn yaml_overrides_nested_values() {
        let yaml = r"
physics:
  time_step: 0.01
world:
  particle_count: 10
  seed: 42
  attractors:
    - position: [1.0, 2.0, 0.0]
      mass: 1000.0
    - mass: 2000.0
stepper:
  step_interval_ms: 5
";
        let config: NBodyConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.physics.time_step, 0.01);
        assert_eq!(config.physics.gravitational_constant, 0.1);
        assert_eq!(config.world.particle_count, 10);
        assert_eq!(config.world.seed, Some(42));
        assert_eq!(config.world.attractors.len(), 2);
        assert_eq!(config.world.attractors[0].position, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(config.world.attractors[1].position, Vec3::ZERO);
        assert_eq!(config.world.attractors[1].mass, 2000.0);
        assert_eq!(config.stepper.step_interval_ms, 5);
    }

    #[test]
    fn inverted_ring_is_rejected() {
        let mut config = NBodyConfig::default();
        config.world.ring_min_radius = 400.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn zero_step_interval_is_rejected() {
        let mut config = NBodyConfig::default();
        config.stepper.step_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let result = NBodyConfig::parse("world: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = NBodyConfig::from_file(Path::new("/nonexistent/nbody-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
