use std::path::PathBuf;

use crate::error::validate_name;
use crate::pool::{Pool, StoreOptions};
use crate::DatabaseError;

pub const DEFAULT_DATABASE: &str = "rank";
pub const DEFAULT_POOL_SIZE: i32 = 20;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Directory holding one `<name>.db` file per database.
    pub data_dir: PathBuf,
    pub databases: Vec<String>,
    /// Zero or negative disables pooling.
    pub pool_size: i32,
}

impl DatabaseConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            databases: vec![DEFAULT_DATABASE.to_string()],
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn from_cli_or_env_or_yaml(cli_arg: Option<PathBuf>, yaml_config: Option<PathBuf>) -> Self {
        let data_dir = if let Some(arg) = cli_arg {
            arg
        } else if let Ok(env) = std::env::var("RANK_DATA_DIR") {
            PathBuf::from(env)
        } else if let Some(yaml) = yaml_config {
            yaml
        } else {
            PathBuf::from("./data")
        };

        Self::new(data_dir)
    }

    pub fn with_databases<I, S>(mut self, databases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.databases = databases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pool_size(mut self, pool_size: i32) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn store_options(&self) -> Result<StoreOptions, DatabaseError> {
        for name in &self.databases {
            validate_name(name)?;
        }
        Ok(StoreOptions {
            data_dir: self.data_dir.clone(),
            databases: self.databases.clone(),
        })
    }

    pub async fn create_pool(&self) -> Result<Pool, DatabaseError> {
        Pool::connect(self).await
    }
}
