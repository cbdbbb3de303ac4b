use std::env;

/// Environment-derived configuration.
///
/// `ACCESS_SECRET` and `REFRESH_SECRET` are deliberately distinct: a leaked
/// access-signing key must not be able to forge refresh tokens, and vice versa.
pub struct Config {
    pub database_url: String,
    /// Optional separate connection target for the revocation deny-list.
    /// Defaults to `database_url` when unset.
    pub revocation_database_url: Option<String>,
    pub access_secret: String,
    pub refresh_secret: String,
    /// bcrypt cost factor for password hashing.
    pub bcrypt_cost: u32,
    pub server_port: u16,
    pub server_host: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            revocation_database_url: env::var("REVOCATION_DATABASE_URL").ok(),
            access_secret: env::var("ACCESS_SECRET").expect("ACCESS_SECRET must be set"),
            refresh_secret: env::var("REFRESH_SECRET").expect("REFRESH_SECRET must be set"),
            bcrypt_cost: env::var("BCRYPT_COST")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("BCRYPT_COST must be a number"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
