use std::env;

/// CORS headers attached uniformly to every response.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origin: String,
    pub allowed_headers: String,
    pub allowed_methods: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_owned(),
            allowed_headers: "content-type,x-functions-key".to_owned(),
            allowed_methods: "GET,POST,PATCH,OPTIONS".to_owned(),
        }
    }
}

/// Server configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    /// Path to the page-catalog JSON file. Absent means an empty catalog.
    pub catalog_path: Option<String>,
    pub cors: CorsConfig,
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_string("PROGRESS_BIND_ADDR", "0.0.0.0:7071"),
            database_url: env_string("PROGRESS_DATABASE_URL", "sqlite://progress.db?mode=rwc"),
            catalog_path: env_opt("PROGRESS_CATALOG_PATH"),
            cors: CorsConfig {
                allowed_origin: env_string("CORS_ALLOWED_ORIGIN", "*"),
                allowed_headers: env_string("CORS_ALLOWED_HEADERS", "content-type,x-functions-key"),
                allowed_methods: env_string("CORS_ALLOWED_METHODS", "GET,POST,PATCH,OPTIONS"),
            },
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_owned())
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
