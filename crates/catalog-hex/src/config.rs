use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    /// Page served at `/`, if any.
    pub index_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = env::var("SERVER_PORT").unwrap_or_else(|_| "3000".into());
        if server_port.parse::<u16>().is_err() {
            anyhow::bail!("SERVER_PORT must be a port number, got {server_port:?}");
        }
        let database_url = env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());
        let index_file = env::var_os("INDEX_FILE").map(PathBuf::from);
        Ok(Self {
            server_port,
            database_url,
            index_file,
        })
    }
}
