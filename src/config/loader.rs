// src/config/loader.rs
//! Layered configuration loader: defaults, TOML files, then environment overrides

use crate::config::{constants::paths, EngineConfig};
use crate::error::EmgResult;
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration loader
///
/// Later sources win: each existing file in `config_paths` order, then
/// `EMG_SIGNAL__<SECTION>__<KEY>` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    use_environment: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create loader over the standard search paths
    pub fn new() -> Self {
        Self {
            config_paths: Self::discover_config_paths(),
            use_environment: true,
        }
    }

    /// Create loader with custom paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            use_environment: true,
        }
    }

    /// Skip environment overrides
    pub fn without_environment(mut self) -> Self {
        self.use_environment = false;
        self
    }

    /// Load, merge and validate the engine configuration
    pub fn load(&self) -> EmgResult<EngineConfig> {
        let mut builder = Config::builder();
        for path in &self.config_paths {
            debug!(path = %path.display(), "adding config source");
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml).required(false));
        }
        if self.use_environment {
            builder = builder.add_source(
                Environment::with_prefix(paths::ENV_PREFIX)
                    .separator(paths::ENV_SEPARATOR)
                    .try_parsing(true),
            );
        }

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(
            channels = config.acquisition.channel_count,
            sampling_rate_hz = config.acquisition.sampling_rate_hz,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Write a configuration as pretty TOML
    pub fn export_config<P: AsRef<Path>>(&self, config: &EngineConfig, path: P) -> EmgResult<()> {
        let toml_content = toml::to_string_pretty(config)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(paths::SYSTEM_CONFIG_PATH)];
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(paths::USER_CONFIG_DIR)
                    .join("config.toml"),
            );
        }
        paths.push(PathBuf::from(paths::LOCAL_CONFIG_FILE));
        paths
    }
}
