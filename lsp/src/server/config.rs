use std::sync::PoisonError;

use sassline_core::FileSettings;
use serde::Deserialize;
use tower_lsp::lsp_types::ConfigurationItem;
use tracing::debug;

use super::state::SasslineServer;

pub(crate) const CONFIG_SECTION: &str = "sass";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServerConfig {
    pub(crate) max_number_of_problems: usize,
    /// Indentation used when parsing open documents.
    pub(crate) settings: FileSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_number_of_problems: 1000,
            settings: FileSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SassConfigSection {
    #[serde(default)]
    pub(crate) max_number_of_problems: Option<usize>,
    #[serde(default)]
    pub(crate) tab_size: Option<usize>,
    #[serde(default)]
    pub(crate) insert_spaces: Option<bool>,
}

impl ServerConfig {
    /// Overlay the values a client sent; absent keys keep their defaults.
    pub(crate) fn apply(&mut self, section: SassConfigSection) {
        let defaults = ServerConfig::default();
        self.max_number_of_problems = section
            .max_number_of_problems
            .unwrap_or(defaults.max_number_of_problems);
        self.settings = FileSettings::new(
            section.tab_size.filter(|v| *v > 0).unwrap_or(defaults.settings.tab_size),
            section.insert_spaces.unwrap_or(defaults.settings.insert_spaces),
        );
    }
}

impl SasslineServer {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(CONFIG_SECTION.to_string()),
        }];

        if let Ok(values) = self.client.configuration(items).await {
            if let Some(val) = values.into_iter().next() {
                match serde_json::from_value::<SassConfigSection>(val) {
                    Ok(section) => {
                        let mut guard = self.config.lock().unwrap_or_else(PoisonError::into_inner);
                        guard.apply(section);
                        debug!(config = ?*guard, "configuration loaded");
                    }
                    Err(err) => debug!(error = %err, "ignoring malformed configuration"),
                }
            }
        }
    }

    pub(crate) fn config(&self) -> ServerConfig {
        self.config.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
