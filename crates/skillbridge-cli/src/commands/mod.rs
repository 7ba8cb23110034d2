pub mod chat;
pub mod community;
pub mod grade;
pub mod init;
pub mod learn;
pub mod mentorship;
pub mod profile;
pub mod resources;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use skillbridge_client::config::load_config_from;
use skillbridge_client::{create_backend, SkillbridgeConfig};
use skillbridge_core::engine::LearningService;

/// Global options shared by every command.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub profile: Option<PathBuf>,
}

impl Context {
    pub fn config(&self) -> Result<SkillbridgeConfig> {
        load_config_from(self.config_path.as_deref())
    }

    /// The service over the configured backend, plus the config it came from.
    pub fn service(&self) -> Result<(LearningService, SkillbridgeConfig)> {
        let mut config = self.config()?;
        if let Some(profile) = &self.profile {
            config.offline_profile = Some(profile.clone());
        }
        let backend = create_backend(&config, self.catalog.as_deref())?;
        tracing::debug!(backend = backend.name(), "backend ready");
        Ok((LearningService::new(backend), config))
    }
}

pub(crate) fn table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table.set_header(header.iter().map(|h| Cell::new(h)).collect::<Vec<_>>());
    table
}
