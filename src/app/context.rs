use std::path::Path;
use std::sync::Arc;

use crate::app::error::{QuireError, Result};
use crate::config::Config;
use crate::cycle::CycleRunner;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::resolver::ItemResolver;

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub resolver: Arc<ItemResolver>,
}

impl AppContext {
    /// Read configuration from `config_path`, or from the default location.
    pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
        match config_path {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
        .map_err(|e| QuireError::Config(e.to_string()))
    }

    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.source)?);
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Result<Self> {
        let resolver = Arc::new(ItemResolver::from_config(fetcher.clone(), &config)?);

        Ok(Self {
            config,
            fetcher,
            resolver,
        })
    }

    pub fn cycle_runner(&self) -> CycleRunner {
        CycleRunner::with_workers(
            self.fetcher.clone(),
            self.resolver.clone(),
            self.config.daemon.workers,
        )
    }
}
