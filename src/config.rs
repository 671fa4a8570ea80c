use std::{env, fmt::Display, str::FromStr};

use tracing::info;

/// Server-side configuration, read from the environment (`.env` is loaded
/// by `main` before this runs).
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "3000"),
            jwt_secret: required("JWT_SECRET"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .unwrap_or_else(|e| panic!("Invalid {key} value: {e}"))
}

// No baked-in fallback: the token guard is pointless with a secret that
// ships in the source tree.
fn required(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} must be set in the environment"))
}
