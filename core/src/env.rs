use std::{env::var, sync::OnceLock};


static ENV: OnceLock<Env> = OnceLock::new();

#[derive(Debug)]
pub struct Env {
    pub redis_url: String,
    pub mongo_url: String,
    pub mongo_database: String,
    pub bind_address: String,
    pub port: u16,
    pub session_ttl: i64,
    pub dev: bool
}

impl Default for Env {
    fn default() -> Self {
        let dev = match var("DEV") {
            Ok(value) => !(value == "false" || value == "0"),
            Err(_) => cfg!(debug_assertions)
        };

        Self {
            redis_url: var("REDIS_URL").expect("REDIS_URL is not set"),
            mongo_url: var("MONGO_URL").expect("MONGO_URL is not set"),
            mongo_database: var("MONGO_DATABASE")
                .unwrap_or("fritter".to_string()),
            bind_address: var("BIND_ADDRESS")
                .unwrap_or("0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or("8000".to_string())
                .parse()
                .expect("PORT is not a valid port"),
            session_ttl: var("SESSION_TTL")
                .unwrap_or("604800".to_string())
                .parse()
                .expect("SESSION_TTL is not a valid number"),
            dev
        }
    }
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn env() -> &'static Env {
    ENV.get_or_init(Env::new)
}
