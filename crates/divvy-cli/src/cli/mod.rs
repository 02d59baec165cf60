//! Command-line dispatch and shared context.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use divvy_config::{Config, ConfigManager};
use divvy_core::CoreError;
use divvy_storage_json::{JsonLedgerStorage, StoragePaths};

/// Everything a command handler needs: loaded config and an open storage
/// backend.
pub struct CliContext {
    pub config: Config,
    pub config_manager: ConfigManager,
    pub storage: JsonLedgerStorage,
}

impl CliContext {
    fn open(data_dir: Option<PathBuf>) -> Result<Self, CoreError> {
        let base = data_dir.unwrap_or_else(default_base_dir);
        let config_manager = ConfigManager::with_base_dir(base.clone())
            .map_err(|err| CoreError::Storage(err.to_string()))?;
        let config = config_manager
            .load()
            .map_err(|err| CoreError::Storage(err.to_string()))?;
        // Configured root overrides win; otherwise ledgers and backups
        // live under the base directory.
        let storage = JsonLedgerStorage::new(StoragePaths {
            ledger_root: config
                .default_ledger_root
                .clone()
                .unwrap_or_else(|| base.join("ledgers")),
            backup_root: config
                .default_backup_root
                .clone()
                .unwrap_or_else(|| base.join("backups")),
        })?;
        Ok(Self {
            config,
            config_manager,
            storage,
        })
    }

    pub fn save_config(&self) -> Result<(), CoreError> {
        self.config_manager
            .save(&self.config)
            .map_err(|err| CoreError::Storage(err.to_string()))
    }
}

fn default_base_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Divvy")
}

/// Entry point for the binary: parses arguments and dispatches to the
/// command handlers.
pub fn run_cli() -> Result<(), CoreError> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let data_dir = extract_flag_value(&mut args, "--data-dir").map(PathBuf::from);

    let Some(command) = args.first().cloned() else {
        output::print_usage();
        return Ok(());
    };
    let rest = args.split_off(1);

    let mut ctx = CliContext::open(data_dir)?;
    if !ctx.config.ui_color_enabled {
        colored::control::set_override(false);
    }
    tracing::debug!(command = %command, "dispatching");

    match command.as_str() {
        "ledger" => commands::ledger(&mut ctx, &rest),
        "member" => commands::member(&mut ctx, &rest),
        "expense" => commands::expense(&mut ctx, &rest),
        "balance" => commands::balance(&mut ctx, &rest),
        "settle" => commands::settle(&mut ctx, &rest),
        "settle-all" => commands::settle_all(&mut ctx, &rest),
        "warnings" => commands::warnings(&mut ctx, &rest),
        "help" | "--help" | "-h" => {
            output::print_usage();
            Ok(())
        }
        other => Err(CoreError::InvalidOperation(format!(
            "unknown command `{other}`, try `help`"
        ))),
    }
}

/// Pulls `--flag value` out of the argument list, wherever it appears.
pub fn extract_flag_value(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let index = args.iter().position(|arg| arg == flag)?;
    if index + 1 >= args.len() {
        args.remove(index);
        return None;
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Some(value)
}
