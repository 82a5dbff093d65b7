//! Configuration types for the schedule calculator.

use pyo3::prelude::*;
use thiserror::Error;

/// Invalid configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown pass strategy: {0}")]
    UnknownStrategy(String),
    #[error("Unknown terminal rule: {0}")]
    UnknownTerminalRule(String),
    #[error("Unknown duration policy: {0}")]
    UnknownDurationPolicy(String),
    #[error("Critical float tolerance must be non-negative, got {0}")]
    NegativeTolerance(i64),
}

/// How the forward and backward passes walk the activity graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassStrategy {
    /// One sweep in Kahn order; cycles are reported and left unscheduled.
    Topological,
    /// Repeated full scans until nothing changes, capped at twice the activity count.
    FixedPoint,
}

impl PassStrategy {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "topological" => Ok(Self::Topological),
            "fixed_point" => Ok(Self::FixedPoint),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Topological => "topological",
            Self::FixedPoint => "fixed_point",
        }
    }
}

/// Late finish of an activity that nothing depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalRule {
    /// The project finish (latest early finish).
    ProjectFinish,
    /// The activity's own early finish, falling back to the project finish.
    EarlyFinish,
}

impl TerminalRule {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "project_finish" => Ok(Self::ProjectFinish),
            "early_finish" => Ok(Self::EarlyFinish),
            other => Err(ConfigError::UnknownTerminalRule(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ProjectFinish => "project_finish",
            Self::EarlyFinish => "early_finish",
        }
    }
}

/// Treatment of negative durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DurationPolicy {
    Reject,
    Clamp,
}

impl DurationPolicy {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "reject" => Ok(Self::Reject),
            "clamp" => Ok(Self::Clamp),
            other => Err(ConfigError::UnknownDurationPolicy(other.to_string())),
        }
    }
}

/// Configuration for a schedule run.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ScheduleConfig {
    /// Pass strategy: "topological" or "fixed_point"
    #[pyo3(get, set)]
    pub strategy: String,
    /// Late finish for activities without successors: "project_finish" or "early_finish"
    #[pyo3(get, set)]
    pub terminal_rule: String,
    /// Negative durations: "reject" or "clamp"
    #[pyo3(get, set)]
    pub negative_durations: String,
    /// Extra days of float still counted as critical
    #[pyo3(get, set)]
    pub critical_float_tolerance: i64,
    /// Verbosity level: 0=silent, 1=warnings, 2=passes, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            strategy: "topological".to_string(),
            terminal_rule: "project_finish".to_string(),
            negative_durations: "reject".to_string(),
            critical_float_tolerance: 0,
            verbosity: 0,
        }
    }
}

impl ScheduleConfig {
    /// Parse every string-valued option, failing on the first unknown name.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        if self.critical_float_tolerance < 0 {
            return Err(ConfigError::NegativeTolerance(self.critical_float_tolerance));
        }
        Ok(ResolvedConfig {
            strategy: PassStrategy::parse(&self.strategy)?,
            terminal_rule: TerminalRule::parse(&self.terminal_rule)?,
            duration_policy: DurationPolicy::parse(&self.negative_durations)?,
            critical_float_tolerance: self.critical_float_tolerance,
            verbosity: self.verbosity,
        })
    }
}

#[pymethods]
impl ScheduleConfig {
    #[new]
    #[pyo3(signature = (
        strategy=None,
        terminal_rule=None,
        negative_durations=None,
        critical_float_tolerance=None,
        verbosity=None
    ))]
    fn new(
        strategy: Option<String>,
        terminal_rule: Option<String>,
        negative_durations: Option<String>,
        critical_float_tolerance: Option<i64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            strategy: strategy.unwrap_or(defaults.strategy),
            terminal_rule: terminal_rule.unwrap_or(defaults.terminal_rule),
            negative_durations: negative_durations.unwrap_or(defaults.negative_durations),
            critical_float_tolerance: critical_float_tolerance
                .unwrap_or(defaults.critical_float_tolerance),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleConfig(strategy={:?}, terminal_rule={:?}, negative_durations={:?})",
            self.strategy, self.terminal_rule, self.negative_durations
        )
    }
}

/// `ScheduleConfig` with its string options parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub strategy: PassStrategy,
    pub terminal_rule: TerminalRule,
    pub duration_policy: DurationPolicy,
    pub critical_float_tolerance: i64,
    pub verbosity: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve() {
        let resolved = ScheduleConfig::default().resolve().unwrap();
        assert_eq!(resolved.strategy, PassStrategy::Topological);
        assert_eq!(resolved.terminal_rule, TerminalRule::ProjectFinish);
        assert_eq!(resolved.duration_policy, DurationPolicy::Reject);
        assert_eq!(resolved.critical_float_tolerance, 0);
    }

    #[test]
    fn test_unknown_names_rejected() {
        let config = ScheduleConfig {
            strategy: "greedy".to_string(),
            ..ScheduleConfig::default()
        };
        assert_eq!(
            config.resolve().unwrap_err(),
            ConfigError::UnknownStrategy("greedy".to_string())
        );

        let config = ScheduleConfig {
            terminal_rule: "whenever".to_string(),
            ..ScheduleConfig::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::UnknownTerminalRule(_))
        ));

        let config = ScheduleConfig {
            negative_durations: "ignore".to_string(),
            ..ScheduleConfig::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::UnknownDurationPolicy(_))
        ));
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let config = ScheduleConfig {
            critical_float_tolerance: -1,
            ..ScheduleConfig::default()
        };
        assert_eq!(config.resolve(), Err(ConfigError::NegativeTolerance(-1)));
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in [PassStrategy::Topological, PassStrategy::FixedPoint] {
            assert_eq!(PassStrategy::parse(strategy.name()), Ok(strategy));
        }
        for rule in [TerminalRule::ProjectFinish, TerminalRule::EarlyFinish] {
            assert_eq!(TerminalRule::parse(rule.name()), Ok(rule));
        }
    }
}
