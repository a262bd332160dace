use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use database::config::{DEFAULT_DATABASE, DEFAULT_POOL_SIZE};
use database::DatabaseConfig;
use serde::Deserialize;

/// Command-line flags. Anything left unset falls back to the YAML file
/// given with `--config`, then to the built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rank-server", about = "Game ranking and review catalog API")]
pub struct ServerArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bind address
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the database files (env: RANK_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Database the repositories read and write
    #[arg(long)]
    pub database: Option<String>,

    /// Maximum concurrent store sessions; 0 disables pooling
    #[arg(long)]
    pub pool_size: Option<i32>,

    /// Token required in `Authorization: Bearer` for mutating requests
    #[arg(long, env = "RANK_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Extra attempts at reaching the store during startup
    #[arg(long)]
    pub connect_retries: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub database: String,
    pub pool_size: i32,
    pub api_token: Option<String>,
    pub connect_retries: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            database: DEFAULT_DATABASE.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            api_token: None,
            connect_retries: 5,
        }
    }
}

impl ServerConfig {
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn load(args: &ServerArgs) -> anyhow::Result<Self> {
        let file = match &args.config {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        Ok(file.merge(args))
    }

    fn merge(mut self, args: &ServerArgs) -> Self {
        if let Some(bind) = &args.bind {
            self.bind = bind.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(database) = &args.database {
            self.database = database.clone();
        }
        if let Some(pool_size) = args.pool_size {
            self.pool_size = pool_size;
        }
        if let Some(token) = &args.api_token {
            self.api_token = Some(token.clone());
        }
        if let Some(retries) = args.connect_retries {
            self.connect_retries = retries;
        }
        self.data_dir =
            DatabaseConfig::from_cli_or_env_or_yaml(args.data_dir.clone(), Some(self.data_dir))
                .data_dir;
        self
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.data_dir)
            .with_databases([self.database.clone()])
            .with_pool_size(self.pool_size)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
