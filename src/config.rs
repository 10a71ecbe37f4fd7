use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub jwt_secret: String,
    pub admin_user: String,
    pub admin_password_hash: String,
    pub log_level: String,
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "recauda-dev-secret".to_string()),
            admin_user: env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string()),
            // Default hash corresponds to the development password "password".
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").unwrap_or_else(|_| {
                "$2a$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW".to_string()
            }),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

// Global static accessible everywhere
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
