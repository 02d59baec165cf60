use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Stores user-configurable preferences and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub locale: String,
    /// ISO 4217 code of the single currency all amounts are recorded in.
    pub currency: String,
    /// Display name the viewer goes by when added to a new ledger.
    #[serde(default = "Config::default_viewer_name")]
    pub viewer_name: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_ledger: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for ledgers. Defaults to
    /// `~/Documents/Divvy/ledgers`.
    pub default_ledger_root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for backups. Defaults to
    /// `~/Documents/Divvy/backups`.
    pub default_backup_root: Option<PathBuf>,
}

impl Config {
    fn default_viewer_name() -> String {
        "Me".into()
    }

    fn default_ui_color_enabled() -> bool {
        true
    }

    /// Resolved ledger root, honoring the configured override.
    pub fn ledger_root(&self) -> PathBuf {
        self.default_ledger_root
            .clone()
            .unwrap_or_else(|| Self::documents_root().join("ledgers"))
    }

    /// Resolved backup root, honoring the configured override.
    pub fn backup_root(&self) -> PathBuf {
        self.default_backup_root
            .clone()
            .unwrap_or_else(|| Self::documents_root().join("backups"))
    }

    fn documents_root() -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Divvy")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "VND".into(),
            viewer_name: Self::default_viewer_name(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            last_opened_ledger: None,
            default_ledger_root: None,
            default_backup_root: None,
        }
    }
}
