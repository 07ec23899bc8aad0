use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::solver::FallbackPolicy;

pub const CONFIG_FILE: &str = "registrar.toml";
pub const ENV_PREFIX: &str = "REGISTRAR_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    pub bind_address: String,
    pub log_filter: String,
    pub fallback: FallbackPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            log_filter: "info".to_string(),
            fallback: FallbackPolicy::Reject,
        }
    }
}

/// Defaults, then `registrar.toml`, then `REGISTRAR_*` environment variables.
pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}

fn figment() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_env() {
        figment::Jail::expect_with(|_jail| {
            assert_eq!(get_config().unwrap(), Config::default());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                    bind_address = "0.0.0.0:9000"
                    fallback = "unroomed"
                "#,
            )?;
            jail.set_env("REGISTRAR_BIND_ADDRESS", "127.0.0.1:7000");

            let config = get_config().unwrap();
            assert_eq!(config.bind_address, "127.0.0.1:7000");
            assert_eq!(config.fallback, FallbackPolicy::Unroomed);
            assert_eq!(config.log_filter, "info");
            Ok(())
        });
    }
}
