//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use edge_core::WorkerConfig;

use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["edge.toml", ".edge.toml", "edge.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Worker configuration.
    pub config: WorkerConfig,
    /// Where the configuration came from; `None` for built-in defaults.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let (config, config_path) = match config_path {
            Some(path) => {
                let config = WorkerConfig::load(path)
                    .with_context(|| format!("Failed to load config from {}", path))?;
                (config, Some(PathBuf::from(path)))
            }
            None => {
                let cwd = std::env::current_dir().context("Failed to get current directory")?;
                match Self::find_config(&cwd)? {
                    Some((config, path)) => (config, Some(path)),
                    None => (WorkerConfig::default(), None),
                }
            }
        };

        Ok(Self {
            config,
            config_path,
            output,
        })
    }

    /// Find config file in directory tree. A file that exists but fails to
    /// load is an error rather than silently skipped.
    fn find_config(start: &Path) -> Result<Option<(WorkerConfig, PathBuf)>> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let path = current.join(name);
                if path.exists() {
                    let config = WorkerConfig::load(&path)
                        .with_context(|| format!("Failed to load config from {}", path.display()))?;
                    return Ok(Some((config, path)));
                }
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Human-readable config source.
    pub fn config_source(&self) -> String {
        match &self.config_path {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        }
    }
}
