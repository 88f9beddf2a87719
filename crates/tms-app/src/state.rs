use std::str::FromStr;

use anyhow::Context;
use tms_config::Config;
use tms_store::TranslationStore;
use tms_translator::{ProviderKind, Translator, create_translator};

pub struct AppState {
    pub config: Config,
    pub store: TranslationStore,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = TranslationStore::open(&config.store.db_path).with_context(|| {
            format!(
                "failed to open translation store at {}",
                config.store.db_path.display()
            )
        })?;

        Ok(Self { config, store })
    }

    /// Provider named on the command line, or the configured default
    pub fn provider_kind(&self, requested: Option<&str>) -> anyhow::Result<ProviderKind> {
        let name = requested.unwrap_or(&self.config.default_provider);
        Ok(ProviderKind::from_str(name)?)
    }

    pub fn translator(&self, kind: ProviderKind) -> anyhow::Result<Box<dyn Translator>> {
        create_translator(kind, kind.config(&self.config))
            .with_context(|| format!("failed to set up {}", kind))
    }
}
