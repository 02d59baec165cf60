//! Terminal rendering helpers.

use colored::Colorize;

use divvy_core::{BalanceSheet, CounterpartyBalance, GlobalSummary};
use divvy_domain::{Ledger, MinorUnits};
use divvy_storage_json::LedgerMetadata;

pub fn print_usage() {
    println!("divvy_cli — split expenses and track who owes whom");
    println!();
    println!("Usage: divvy_cli [--data-dir <path>] <command>");
    println!();
    println!("Commands:");
    println!("  ledger list|create|delete <name>");
    println!("  member add|list|remove <ledger> [name]");
    println!("  expense add <ledger> --payer <name> --amount <n> [--split equal|exact|loan]");
    println!("              [--with a,b,c] [--share a=n,b=n] [--desc text] [--date YYYY-MM-DD]");
    println!("  expense list|remove <ledger> [expense-id]");
    println!("  balance <ledger> [--viewer <name>]");
    println!("  balance --global [--viewer <name>]");
    println!("  settle <ledger> <expense-id> <member>");
    println!("  settle-all <ledger> <member> [--viewer <name>]");
    println!("  warnings <ledger>");
}

pub fn success(message: &str) {
    println!("{} {message}", "ok".green().bold());
}

pub fn notice(message: &str) {
    println!("{} {message}", "--".yellow());
}

/// Renders minor units with thousands separators.
pub fn format_amount(amount: MinorUnits) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn ledger_table(entries: &[LedgerMetadata]) {
    if entries.is_empty() {
        notice("No ledgers yet; create one with `ledger create <name>`");
        return;
    }
    println!(
        "{:<20} {:>8} {:>9}  {}",
        "Ledger".bold(),
        "Members".bold(),
        "Expenses".bold(),
        "Updated".bold()
    );
    for entry in entries {
        println!(
            "{:<20} {:>8} {:>9}  {}",
            entry.name,
            entry.member_count,
            entry.expense_count,
            entry.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}

pub fn member_table(ledger: &Ledger) {
    println!("{} ({} members)", ledger.name.bold(), ledger.member_count());
    for member in &ledger.members {
        println!("  {}  {}", short_id(&member.id.to_string()), member.display_name);
    }
}

pub fn expense_table(ledger: &Ledger) {
    if ledger.expenses.is_empty() {
        notice("No expenses recorded");
        return;
    }
    println!(
        "{:<10} {:<12} {:>14} {:<6}  {}",
        "Id".bold(),
        "Date".bold(),
        "Amount".bold(),
        "Split".bold(),
        "Description".bold()
    );
    for expense in &ledger.expenses {
        let settled = if expense.settled_by.len() == expense.participants.len() {
            "settled".green().to_string()
        } else {
            format!("{}/{}", expense.settled_by.len(), expense.participants.len())
        };
        println!(
            "{:<10} {:<12} {:>14} {:<6}  {} ({settled})",
            short_id(&expense.id.to_string()),
            expense.date,
            format_amount(expense.amount),
            expense.split.to_string(),
            expense.description,
        );
    }
}

pub fn balance_view(viewer: &str, sheet: &BalanceSheet, rows: &[CounterpartyBalance]) {
    println!("Balances for {}", viewer.bold());
    for row in rows {
        if row.amount > 0 {
            println!(
                "  {} owes you {}",
                row.name,
                format_amount(row.amount).green()
            );
        } else {
            println!(
                "  you owe {} {}",
                row.name,
                format_amount(-row.amount).red()
            );
        }
    }
    print_sheet(sheet);
}

pub fn global_summary(viewer: &str, summary: &GlobalSummary) {
    println!("Global balances for {}", viewer.bold());
    for row in &summary.counterparties {
        if row.amount > 0 {
            println!(
                "  {} owes you {}",
                row.name,
                format_amount(row.amount).green()
            );
        } else {
            println!(
                "  you owe {} {}",
                row.name,
                format_amount(-row.amount).red()
            );
        }
    }
    print_sheet(&summary.totals);
}

fn print_sheet(sheet: &BalanceSheet) {
    println!(
        "  receivable {}  payable {}  net {}",
        format_amount(sheet.receivable).green(),
        format_amount(sheet.payable).red(),
        format_amount(sheet.net).bold()
    );
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
