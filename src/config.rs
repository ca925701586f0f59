// src/config.rs
use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_JWT_SECRET: &str = "junkick_fallback_secret_key";
const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 15 * 60 * 1000;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;

// Runtime settings, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage_path: String,
    pub api_prefix: String,
    pub cors_origin: String,
    pub jwt: JwtSettings,
    pub bcrypt_cost: u32,
    pub admin_override: bool,
    // Each client gets `rate_limit_max_requests` per window
    pub rate_limit_window_ms: u64,
    pub rate_limit_max_requests: u32,
}

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expires_hours: i64,
}

impl Config {
    // Build the config from the process environment (after dotenv has run)
    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("⚠️ JWT_SECRET is not set, falling back to the built-in development key");
            DEFAULT_JWT_SECRET.to_string()
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 3000),
            storage_path: env::var("STORAGE_PATH").unwrap_or_else(|_| "./storage".to_string()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            jwt: JwtSettings {
                secret,
                expires_hours: parse_var("JWT_EXPIRES_HOURS", 24),
            },
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST),
            admin_override: parse_var("ADMIN_OVERRIDE", true),
            rate_limit_window_ms: parse_var("RATE_LIMIT_WINDOW_MS", DEFAULT_RATE_LIMIT_WINDOW_MS),
            rate_limit_max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            storage_path: "./storage".to_string(),
            api_prefix: "/api".to_string(),
            cors_origin: "http://localhost:3001".to_string(),
            jwt: JwtSettings {
                secret: DEFAULT_JWT_SECRET.to_string(),
                expires_hours: 24,
            },
            bcrypt_cost: bcrypt::DEFAULT_COST,
            admin_override: true,
            rate_limit_window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("⚠️ Ignoring unparsable {}={:?}, using default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}
