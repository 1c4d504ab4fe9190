use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::TOKEN_TTL;
use crate::error::{Error, Result};

const DB_FILE: &str = "storerate.db";
const SECRET_FILE: &str = ".jwt_secret";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Signing secret for bearer tokens. When unset, the secret file written
    /// by `admin init` inside `data_dir` is used.
    pub jwt_secret: Option<String>,
    pub token_ttl: Duration,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    #[must_use]
    pub fn secret_path(&self) -> PathBuf {
        self.data_dir.join(SECRET_FILE)
    }

    /// Resolves the signing secret once at startup.
    pub fn load_secret(&self) -> Result<String> {
        let secret = match &self.jwt_secret {
            Some(secret) => secret.clone(),
            None => {
                let path = self.secret_path();
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "no signing secret: set JWT_SECRET or run 'storerate admin init' to create {}",
                        path.display()
                    )));
                }
                fs::read_to_string(&path)?
            }
        };

        let secret = secret.trim().to_string();
        if secret.is_empty() {
            return Err(Error::Config("signing secret cannot be empty".to_string()));
        }
        Ok(secret)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5006,
            data_dir: PathBuf::from("./data"),
            jwt_secret: None,
            token_ttl: TOKEN_TTL,
        }
    }
}
