//! TOML configuration loader with validation.
//!
//! Hosts that configure the planner from a file use [`PlannerConfig`];
//! hosts that configure programmatically call the planner setters
//! directly. Validation enforces the same bounds either way.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::queue::MAX_QUEUE_CAPACITY;

/// Configuration loading/validation error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("config I/O error: {0}")]
    Io(String),
    /// TOML parse error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Parameter bounds violation.
    #[error("config validation: {0}")]
    Validation(String),
}

/// Blend tuning section.
#[derive(Debug, Clone, Deserialize)]
pub struct BlendSection {
    /// Whether segment blending is enabled.
    #[serde(default = "default_true")]
    pub enable: bool,
    /// cosθ at or below which a corner counts as tangent.
    #[serde(default = "default_tangent_kink_ratio")]
    pub tangent_kink_ratio: f64,
    /// Colinearity tolerance for parallel/anti-parallel tests.
    #[serde(default = "default_parallel_tol")]
    pub parallel_tol: f64,
}

fn default_true() -> bool {
    true
}

fn default_tangent_kink_ratio() -> f64 {
    0.1
}

fn default_parallel_tol() -> f64 {
    1e-6
}

impl Default for BlendSection {
    fn default() -> Self {
        Self {
            enable: true,
            tangent_kink_ratio: default_tangent_kink_ratio(),
            parallel_tol: default_parallel_tol(),
        }
    }
}

/// Planner configuration, loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Segment queue capacity.
    pub queue_capacity: usize,
    /// Control cycle period [s].
    pub cycle_time: f64,
    /// Nominal velocity limit [uu/s].
    pub max_velocity: f64,
    /// Absolute machine velocity ceiling [uu/s].
    pub abs_max_velocity: f64,
    /// Acceleration limit [uu/s²].
    pub max_acceleration: f64,
    /// Jerk limit, used when a segment carries none [uu/s³].
    pub max_jerk: f64,
    /// Blend tuning.
    #[serde(default)]
    pub blend: BlendSection,
}

impl PlannerConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Enforce parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ConfigError::Validation(format!(
                "queue_capacity {} outside [1, {MAX_QUEUE_CAPACITY}]",
                self.queue_capacity
            )));
        }
        if !(self.cycle_time > 0.0 && self.cycle_time <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "cycle_time {} outside (0, 1] s",
                self.cycle_time
            )));
        }
        for (name, value) in [
            ("max_velocity", self.max_velocity),
            ("abs_max_velocity", self.abs_max_velocity),
            ("max_acceleration", self.max_acceleration),
            ("max_jerk", self.max_jerk),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.abs_max_velocity < self.max_velocity {
            return Err(ConfigError::Validation(format!(
                "abs_max_velocity {} below max_velocity {}",
                self.abs_max_velocity, self.max_velocity
            )));
        }
        if !(0.0..1.0).contains(&self.blend.tangent_kink_ratio) {
            return Err(ConfigError::Validation(format!(
                "blend.tangent_kink_ratio {} outside [0, 1)",
                self.blend.tangent_kink_ratio
            )));
        }
        if !(self.blend.parallel_tol > 0.0 && self.blend.parallel_tol < 0.1) {
            return Err(ConfigError::Validation(format!(
                "blend.parallel_tol {} outside (0, 0.1)",
                self.blend.parallel_tol
            )));
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
queue_capacity = 50
cycle_time = 0.001
max_velocity = 100.0
abs_max_velocity = 200.0
max_acceleration = 1000.0
max_jerk = 10000.0

[blend]
tangent_kink_ratio = 0.2
"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_config() {
        let file = write_temp(VALID);
        let config = PlannerConfig::load(file.path()).unwrap();
        assert_eq!(config.queue_capacity, 50);
        assert_eq!(config.cycle_time, 0.001);
        assert_eq!(config.blend.tangent_kink_ratio, 0.2);
        // Unspecified blend fields fall back to defaults.
        assert!(config.blend.enable);
        assert_eq!(config.blend.parallel_tol, 1e-6);
    }

    #[test]
    fn rejects_non_positive_limit() {
        let file = write_temp(&VALID.replace("max_acceleration = 1000.0", "max_acceleration = 0.0"));
        assert!(matches!(
            PlannerConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_oversize_queue() {
        let file = write_temp(&VALID.replace("queue_capacity = 50", "queue_capacity = 100000"));
        assert!(matches!(
            PlannerConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_velocity_ceiling_below_nominal() {
        let file = write_temp(&VALID.replace("abs_max_velocity = 200.0", "abs_max_velocity = 50.0"));
        assert!(matches!(
            PlannerConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        let file = write_temp("queue_capacity = \"many\"");
        assert!(matches!(
            PlannerConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            PlannerConfig::load(Path::new("/nonexistent/tp.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
