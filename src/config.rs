use serde::Deserialize;

/// Config, read from a TOML file named by the first CLI argument.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// <address>:<port> to serve userfacing endpoints
    pub userfacing_listen_address: String,

    /// <address>:<port> to serve admin endpoints. Expected to be network-isolated;
    /// the admin API does no token verification of its own.
    pub admin_listen_address: String,

    /// <address>:<port> to serve metrics on
    pub metrics_address: String,

    /// By default, output JSON logs. Only if this flag is set to true, output colourful human-friendly logs
    pub human_logs: bool,

    /// Max HTTP body size the API accepts
    #[serde(default = "max_body_size")]
    pub max_body_size: usize,

    /// connection string for the database.
    pub db_dsn: String,

    /// maximum number of connections maintained by PostgresStore
    pub db_pool_size: u32,

    /// maximum seconds waiting for a database connection
    pub db_connection_timeout: u64,

    /// HMAC secret shared with the identity provider, used to verify bearer tokens.
    pub jwt_secret: String,

    /// Webhook that marks the frontend's cached listing page stale. Unset means
    /// revalidation is skipped (local dev, tests).
    pub revalidate_endpoint: Option<String>,

    /// Whether to skip bearer token verification and trust the raw token as a user id.
    /// This should only be true in test environments.
    pub disable_auth: bool,
}

impl Config {
    /// Will crash if the file isn't found or the config is invalid.
    pub fn from_file(filepath: &str) -> Self {
        let contents = std::fs::read_to_string(filepath).expect("Couldn't read from config file");
        let config: Config = toml::from_str(&contents).expect("couldn't parse config file");
        if let Some(endpoint) = &config.revalidate_endpoint {
            url::Url::parse(endpoint).expect("revalidate_endpoint is not a valid URL");
        }
        config
    }
}

fn max_body_size() -> usize {
    65536
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let config: Config = toml::from_str(
            r#"
            userfacing_listen_address = "0.0.0.0:8080"
            admin_listen_address = "127.0.0.1:8081"
            metrics_address = "0.0.0.0:9090"
            human_logs = false
            db_dsn = "postgres://learnboard@localhost/learnboard"
            db_pool_size = 8
            db_connection_timeout = 5
            jwt_secret = "sekrit"
            disable_auth = false
            "#,
        )
        .unwrap();
        assert_eq!(config.max_body_size, 65536);
        assert_eq!(config.revalidate_endpoint, None);
    }
}
