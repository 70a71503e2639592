use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    pub bcrypt_cost: u32,
    pub member_cache_ttl_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("member_cache_ttl_secs", &self.member_cache_ttl_secs)
            .finish()
    }
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed_or("PORT", 5000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "neosec-dev-secret".to_string()), // Set JWT_SECRET in production
            jwt_ttl_secs: parsed_or("JWT_TTL_SECS", 24 * 60 * 60),
            bcrypt_cost: parsed_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
            member_cache_ttl_secs: parsed_or("MEMBER_CACHE_TTL_SECS", 60),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
