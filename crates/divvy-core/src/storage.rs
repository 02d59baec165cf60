use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use divvy_domain::{Ledger, SplitMode};

use crate::CoreError;

/// Describes a persisted backup artifact for a ledger.
#[derive(Debug, Clone)]
pub struct LedgerBackupInfo {
    pub ledger: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing ledgers and
/// backups. Implementations must converge concurrent settlement edits by
/// merging `settled_by` sets rather than overwriting whole expenses.
pub trait LedgerStorage: Send + Sync {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError>;
    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError>;
    fn list_ledgers(&self) -> Result<Vec<String>, CoreError>;
    fn delete_ledger(&self, name: &str) -> Result<(), CoreError>;
    fn save_ledger_to_path(&self, ledger: &Ledger, path: &Path) -> Result<(), CoreError>;
    fn load_ledger_from_path(&self, path: &Path) -> Result<Ledger, CoreError>;
    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<Ledger, CoreError>;
}

/// Detects stale references and other anomalies within a ledger snapshot.
///
/// These are warnings, not errors: balance computation skips stale ids
/// silently, but surfacing them lets the caller decide whether to archive
/// or repair.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let member_ids: HashSet<_> = ledger.members.iter().map(|m| m.id).collect();
    let mut warnings = Vec::new();

    for expense in &ledger.expenses {
        if !member_ids.contains(&expense.payer_id) {
            warnings.push(format!(
                "expense {} references unknown payer {}",
                expense.id, expense.payer_id
            ));
        }
        for participant in &expense.participants {
            if !member_ids.contains(participant) {
                warnings.push(format!(
                    "expense {} references unknown participant {}",
                    expense.id, participant
                ));
            }
        }
        for settled in &expense.settled_by {
            if !expense.participants.contains(settled) {
                warnings.push(format!(
                    "expense {} marks non-participant {} as settled",
                    expense.id, settled
                ));
            }
        }
        if let SplitMode::Exact(shares) = &expense.split {
            for share_holder in shares.keys() {
                if !expense.participants.contains(share_holder) {
                    warnings.push(format!(
                        "expense {} assigns an exact share to non-participant {}",
                        expense.id, share_holder
                    ));
                }
            }
        }
    }
    warnings
}
