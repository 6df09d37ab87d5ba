use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use log::{info, warn};

pub const DEFAULT_PORT: u16 = 5500;
pub const DEFAULT_AUTH_SECRET: &str = "kinship_shared_secret";
const DEFAULT_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
#[error("Invalid {key} value {value:?}: {message}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    message: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub images_dir: PathBuf,
    /// Base of the URLs handed out for uploaded images.
    pub public_url: String,
    pub auth_secret: String,
    /// Largest request body accepted, uploads included.
    pub upload_limit: usize,
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let port = try_load(&lookup, "PORT", DEFAULT_PORT)?;
        let public_url = lookup("PUBLIC_URL").unwrap_or_else(|| {
            let url = format!("http://localhost:{port}");
            info!("PUBLIC_URL not set, using default: {url}");
            url
        });
        let auth_secret = lookup("AUTH_SECRET").unwrap_or_else(|| {
            warn!("AUTH_SECRET not set, using the built-in secret");
            DEFAULT_AUTH_SECRET.to_string()
        });

        Ok(Config {
            port,
            database_path: try_load(&lookup, "DATABASE_PATH", "./db.sqlite3".to_string())?,
            images_dir: try_load(&lookup, "IMAGES_DIR", PathBuf::from("./images"))?,
            public_url,
            auth_secret,
            upload_limit: try_load(&lookup, "UPLOAD_LIMIT_BYTES", DEFAULT_UPLOAD_LIMIT)?,
        })
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    let Some(value) = lookup(key) else {
        info!("{key} not set, using default: {default:?}");
        return Ok(default);
    };
    value.parse().map_err(|err: T::Err| ConfigError {
        key,
        message: err.to_string(),
        value,
    })
}
