//! Host-facing configuration flags.

/// Environment variable enabling verbose call logging.
pub const ENV_VERBOSE: &str = "NAM_VERBOSE";
/// Environment variable enabling request/response tree dumps.
pub const ENV_WIRE_DUMP: &str = "NAM_WIRE_DUMP";

/// Logging switches consulted on every API call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiConfig {
    /// Log call boundaries and wire dumps at INFO instead of DEBUG.
    pub verbose: bool,
    /// Serialize and log request and response trees.
    pub wire_dump: bool,
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `NAM_VERBOSE` and `NAM_WIRE_DUMP`. Unset or unrecognized values
    /// are false.
    pub fn from_env() -> Self {
        Self {
            verbose: env_flag(ENV_VERBOSE),
            wire_dump: env_flag(ENV_WIRE_DUMP),
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn wire_dump(mut self, wire_dump: bool) -> Self {
        self.wire_dump = wire_dump;
        self
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_quiet() {
        let cfg = ApiConfig::default();
        assert!(!cfg.verbose);
        assert!(!cfg.wire_dump);
        assert_eq!(
            cfg.verbose(true).wire_dump(true),
            ApiConfig {
                verbose: true,
                wire_dump: true
            }
        );
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("on"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("enabled"));
    }
}
