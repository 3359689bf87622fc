//! Process-wide runtime configuration.
//!
//! Read from the environment on first use and frozen for the life of the
//! process:
//!
//! - `MRT_SPECIALIZE_LIMIT`: largest carrier slot count that gets a
//!   specialized class (default and maximum 32). Larger shapes use the
//!   ordered-array fallback.
//! - `MRT_RELINK_CALL_SITES`: `0`/`false` keeps every lazily linked call site
//!   on its generic strategy (default: relinking enabled).

use std::sync::OnceLock;

use tracing::warn;

/// Upper bound on the specialization ceiling.
pub const MAX_SPECIALIZE_LIMIT: usize = 32;

const SPECIALIZE_LIMIT_VAR: &str = "MRT_SPECIALIZE_LIMIT";
const RELINK_VAR: &str = "MRT_RELINK_CALL_SITES";

static GLOBAL_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// Runtime tuning knobs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Shapes with at most this many slots get a specialized carrier class.
    pub specialize_limit: usize,
    /// Whether lazily linked call sites may rewrite themselves on first use.
    pub relink_call_sites: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            specialize_limit: MAX_SPECIALIZE_LIMIT,
            relink_call_sites: true,
        }
    }
}

impl RuntimeConfig {
    /// Configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup.
    ///
    /// Malformed values are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = RuntimeConfig::default();

        if let Some(raw) = lookup(SPECIALIZE_LIMIT_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(limit) => config.specialize_limit = limit.min(MAX_SPECIALIZE_LIMIT),
                Err(_) => warn!(
                    var = SPECIALIZE_LIMIT_VAR,
                    value = %raw,
                    "ignoring malformed value, using {}",
                    config.specialize_limit
                ),
            }
        }

        if let Some(raw) = lookup(RELINK_VAR) {
            match parse_flag(&raw) {
                Some(flag) => config.relink_call_sites = flag,
                None => warn!(
                    var = RELINK_VAR,
                    value = %raw,
                    "ignoring malformed value, using {}",
                    config.relink_call_sites
                ),
            }
        }

        config
    }

    /// The process-wide configuration, read from the environment on first use.
    pub fn global() -> &'static RuntimeConfig {
        GLOBAL_CONFIG.get_or_init(RuntimeConfig::from_env)
    }

    /// Install `config` as the process-wide configuration.
    ///
    /// Only succeeds before the first call to [`RuntimeConfig::global`];
    /// otherwise `config` is handed back unchanged.
    pub fn install(config: RuntimeConfig) -> Result<(), RuntimeConfig> {
        GLOBAL_CONFIG.set(config)?;
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(RuntimeConfig::from_lookup(lookup(&[])), RuntimeConfig::default());
    }

    #[test]
    fn specialize_limit_is_clamped() {
        let config = RuntimeConfig::from_lookup(lookup(&[(SPECIALIZE_LIMIT_VAR, "100")]));
        assert_eq!(config.specialize_limit, MAX_SPECIALIZE_LIMIT);

        let config = RuntimeConfig::from_lookup(lookup(&[(SPECIALIZE_LIMIT_VAR, " 4 ")]));
        assert_eq!(config.specialize_limit, 4);

        let config = RuntimeConfig::from_lookup(lookup(&[(SPECIALIZE_LIMIT_VAR, "0")]));
        assert_eq!(config.specialize_limit, 0);
    }

    #[test]
    fn malformed_values_fall_back() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            (SPECIALIZE_LIMIT_VAR, "-3"),
            (RELINK_VAR, "maybe"),
        ]));
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn relink_flag_parses() {
        let config = RuntimeConfig::from_lookup(lookup(&[(RELINK_VAR, "FALSE")]));
        assert!(!config.relink_call_sites);
        let config = RuntimeConfig::from_lookup(lookup(&[(RELINK_VAR, "1")]));
        assert!(config.relink_call_sites);
    }
}
