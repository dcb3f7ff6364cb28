use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{RentifyError, RentifyResult};

const DEFAULT_JWT_SECRET: &str = "rentify-dev-secret";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: String,
    pub addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub bcrypt_cost: u32,
    pub seed_demo: bool,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "rentify_data".to_string(),
            addr: SocketAddr::from(([0, 0, 0, 0], 11111)),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_secs: 3600,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            seed_demo: true,
            log_json: false,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `RENTIFY_*` variables (and a `.env` file if present).
    pub fn from_env() -> RentifyResult<Self> {
        dotenv().ok();
        let defaults = Self::default();
        let config = Self {
            data_dir: env::var("RENTIFY_DATA_DIR").unwrap_or(defaults.data_dir),
            addr: parse_var("RENTIFY_ADDR")?.unwrap_or(defaults.addr),
            jwt_secret: env::var("RENTIFY_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl_secs: parse_var("RENTIFY_TOKEN_TTL_SECS")?.unwrap_or(defaults.token_ttl_secs),
            bcrypt_cost: parse_var("RENTIFY_BCRYPT_COST")?.unwrap_or(defaults.bcrypt_cost),
            seed_demo: parse_var("RENTIFY_SEED_DEMO")?.unwrap_or(defaults.seed_demo),
            log_json: parse_var("RENTIFY_LOG_JSON")?.unwrap_or(defaults.log_json),
            log_dir: env::var("RENTIFY_LOG_DIR").ok().map(PathBuf::from),
        };
        Ok(config)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_var<T: FromStr>(name: &str) -> RentifyResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RentifyError::validation(format!("{} has an invalid value: {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_reads_and_rejects() {
        env::set_var("RENTIFY_TEST_PORTLESS_TTL", "120");
        assert_eq!(parse_var::<u64>("RENTIFY_TEST_PORTLESS_TTL").unwrap(), Some(120));

        env::set_var("RENTIFY_TEST_BAD_BOOL", "maybe");
        assert!(parse_var::<bool>("RENTIFY_TEST_BAD_BOOL").is_err());

        assert_eq!(parse_var::<u64>("RENTIFY_TEST_UNSET_VAR").unwrap(), None);
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.addr.port(), 11111);
        assert_eq!(config.data_dir, "rentify_data");
        assert!(config.seed_demo);
    }
}
