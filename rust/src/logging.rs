//! Logging macros for the schedule calculator with verbosity level control.
//!
//! Zero-cost when disabled (verbosity=0). Levels:
//! - 0: SILENT
//! - 1: WARNINGS (dangling predecessors, cycles, non-convergence)
//! - 2: PASSES (one line per pass: iterations, project finish)
//! - 3: DEBUG (per-activity dates)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_WARNINGS: u8 = 1;
pub const VERBOSITY_PASSES: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at WARNINGS level (verbosity >= 1).
#[macro_export]
macro_rules! log_warn {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_WARNINGS {
            eprintln!("[cpm] warning: {}", format_args!($($arg)*));
        }
    };
}

/// Log at PASSES level (verbosity >= 2).
#[macro_export]
macro_rules! log_pass {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_PASSES {
            eprintln!("[cpm] {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[cpm]   {}", format_args!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_ordered() {
        assert!(VERBOSITY_SILENT < VERBOSITY_WARNINGS);
        assert!(VERBOSITY_WARNINGS < VERBOSITY_PASSES);
        assert!(VERBOSITY_PASSES < VERBOSITY_DEBUG);
    }

    #[test]
    fn test_log_macros_silent() {
        let verbosity = VERBOSITY_SILENT;
        log_warn!(verbosity, "cycle among {} activities", 2);
        log_pass!(verbosity, "forward pass: {} iterations", 1);
        log_debug!(verbosity, "{} es={}", "a", "2024-01-01");
    }
}
