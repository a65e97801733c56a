#![forbid(unsafe_code)]

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings. Every flag falls back to its environment variable, so a
/// `.env` file loaded before parsing is enough to run the server.
#[derive(Clone, Debug, Parser)]
#[command(
    name = "notegraph-server",
    version,
    about = "Notes, checklists and graph canvases with incremental sync"
)]
pub struct Config {
    /// Directory holding the SQLite database.
    #[arg(long, env = "NOTEGRAPH_DB_DIR", default_value = "./data")]
    pub db_dir: PathBuf,

    #[arg(long, env = "NOTEGRAPH_BIND_ADDR", default_value = "0.0.0.0:3001")]
    pub bind_addr: SocketAddr,

    /// Uploaded images are written here and served under `/uploads`.
    #[arg(long, env = "NOTEGRAPH_UPLOAD_DIR", default_value = "./uploads")]
    pub upload_dir: PathBuf,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(long, env = "NOTEGRAPH_TOKEN_TTL_SECS", default_value_t = 3600)]
    pub token_ttl_secs: u64,
}

impl Config {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "notegraph-server",
            "--jwt-secret",
            "s3cret",
            "--bind-addr",
            "127.0.0.1:8080",
            "--db-dir",
            "/tmp/ng-db",
            "--token-ttl-secs",
            "60",
        ])
        .unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.db_dir, PathBuf::from("/tmp/ng-db"));
        assert_eq!(config.token_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn malformed_bind_address_is_rejected() {
        let parsed = Config::try_parse_from([
            "notegraph-server",
            "--jwt-secret",
            "s3cret",
            "--bind-addr",
            "not-an-addr",
        ]);
        assert!(parsed.is_err());
    }
}
