//! Command handlers behind the CLI surface.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;

use divvy_core::{
    normalize_ledger, storage::ledger_warnings, BalanceService, CoreError, ExpenseService,
    LedgerStorage, MemberService, SettleOutcome, SettlementService, SummaryService, SELF_SENTINEL,
};
use divvy_domain::{Expense, Ledger, Member, MinorUnits, SplitMode};

use super::{extract_flag_value, output, CliContext};

pub fn ledger(ctx: &mut CliContext, args: &[String]) -> Result<(), CoreError> {
    match args.first().map(String::as_str) {
        Some("list") | None => {
            let entries = ctx.storage.list_ledger_metadata()?;
            output::ledger_table(&entries);
            Ok(())
        }
        Some("create") => {
            let name = required(args.get(1), "ledger create <name>")?;
            let mut ledger = Ledger::new(name.clone());
            // The viewer is always a member of their own ledgers.
            MemberService::add(&mut ledger, Member::new(ctx.config.viewer_name.clone()))?;
            ctx.storage.save_ledger(&name, &ledger)?;
            remember_ledger(ctx, &name)?;
            tracing::info!(ledger = %name, "created ledger");
            output::success(&format!("Created ledger `{name}`"));
            Ok(())
        }
        Some("delete") => {
            let name = required(args.get(1), "ledger delete <name>")?;
            ctx.storage.delete_ledger(&name)?;
            output::success(&format!("Deleted ledger `{name}`"));
            Ok(())
        }
        Some(other) => Err(usage_error(&format!("unknown ledger action `{other}`"))),
    }
}

pub fn member(ctx: &mut CliContext, args: &[String]) -> Result<(), CoreError> {
    let action = required(args.first(), "member <add|list|remove> <ledger> ...")?;
    let slug = required(args.get(1), "member <action> <ledger> ...")?;
    let mut ledger = ctx.storage.load_ledger(&slug)?;

    match action.as_str() {
        "add" => {
            let name = required(args.get(2), "member add <ledger> <name>")?;
            MemberService::add(&mut ledger, Member::new(name.clone()))?;
            ctx.storage.save_ledger(&slug, &ledger)?;
            output::success(&format!("Added `{name}` to `{slug}`"));
        }
        "list" => output::member_table(&ledger),
        "remove" => {
            let name = required(args.get(2), "member remove <ledger> <name>")?;
            let member_id = member_id_by_name(&ledger, &name)?;
            MemberService::remove(&mut ledger, member_id)?;
            ctx.storage.save_ledger(&slug, &ledger)?;
            output::success(&format!("Removed `{name}` and pruned their expenses"));
        }
        other => return Err(usage_error(&format!("unknown member action `{other}`"))),
    }
    Ok(())
}

pub fn expense(ctx: &mut CliContext, args: &[String]) -> Result<(), CoreError> {
    let action = required(args.first(), "expense <add|list|remove> <ledger> ...")?;
    let slug = required(args.get(1), "expense <action> <ledger> ...")?;
    let mut ledger = ctx.storage.load_ledger(&slug)?;

    match action.as_str() {
        "add" => {
            let mut rest: Vec<String> = args[2..].to_vec();
            let expense = parse_expense(&ledger, &mut rest)?;
            let amount = expense.amount;
            ExpenseService::add(&mut ledger, expense)?;
            ctx.storage.save_ledger(&slug, &ledger)?;
            remember_ledger(ctx, &slug)?;
            tracing::info!(ledger = %slug, amount, "recorded expense");
            output::success(&format!(
                "Recorded {} in `{slug}`",
                output::format_amount(amount)
            ));
        }
        "list" => output::expense_table(&ledger),
        "remove" => {
            let id = required(args.get(2), "expense remove <ledger> <expense-id>")?;
            let expense_id = expense_id_by_prefix(&ledger, &id)?;
            ExpenseService::remove(&mut ledger, expense_id)?;
            ctx.storage.save_ledger(&slug, &ledger)?;
            output::success("Expense removed");
        }
        other => return Err(usage_error(&format!("unknown expense action `{other}`"))),
    }
    Ok(())
}

pub fn balance(ctx: &mut CliContext, args: &[String]) -> Result<(), CoreError> {
    let mut rest = args.to_vec();
    let viewer_name = extract_flag_value(&mut rest, "--viewer")
        .unwrap_or_else(|| ctx.config.viewer_name.clone());

    if rest.first().map(String::as_str) == Some("--global") {
        // The viewer may carry a different member id per ledger; rewrite
        // them all to one canonical id so balances merge across ledgers.
        let mut ledgers: Vec<Ledger> = Vec::new();
        let mut viewer_id: Option<Uuid> = None;
        for slug in ctx.storage.list_ledgers()? {
            let mut ledger = ctx.storage.load_ledger(&slug)?;
            if let Ok(id) = resolve_viewer(ctx, &slug, &mut ledger, &viewer_name) {
                let canonical = *viewer_id.get_or_insert(id);
                if id != canonical {
                    divvy_core::reassign_member(&mut ledger, id, canonical);
                }
                ledgers.push(ledger);
            }
        }
        let Some(viewer_id) = viewer_id else {
            return Err(CoreError::MemberNotFound(viewer_name));
        };
        let summary = SummaryService::global_balances(&ledgers, viewer_id);
        output::global_summary(&viewer_name, &summary);
        return Ok(());
    }

    let slug = required(rest.first(), "balance <ledger> [--viewer <name>]")?;
    let mut ledger = ctx.storage.load_ledger(&slug)?;
    let viewer_id = resolve_viewer(ctx, &slug, &mut ledger, &viewer_name)?;

    let sheet = BalanceService::aggregate_balances(&ledger, viewer_id);
    let rows = BalanceService::counterparty_balances(&ledger, viewer_id);
    output::balance_view(&viewer_name, &sheet, &rows);
    remember_ledger(ctx, &slug)?;
    Ok(())
}

pub fn settle(ctx: &mut CliContext, args: &[String]) -> Result<(), CoreError> {
    let slug = required(args.first(), "settle <ledger> <expense-id> <member>")?;
    let id = required(args.get(1), "settle <ledger> <expense-id> <member>")?;
    let name = required(args.get(2), "settle <ledger> <expense-id> <member>")?;

    let mut ledger = ctx.storage.load_ledger(&slug)?;
    let expense_id = expense_id_by_prefix(&ledger, &id)?;
    let member_id = member_id_by_name(&ledger, &name)?;

    match SettlementService::settle(&mut ledger, expense_id, member_id) {
        SettleOutcome::Settled => output::success(&format!("`{name}` marked as repaid")),
        SettleOutcome::Unsettled => output::success(&format!("`{name}` marked as pending again")),
        SettleOutcome::Skipped => {
            output::notice("Nothing to settle: stale expense or member is not a participant");
            return Ok(());
        }
    }
    ctx.storage.save_ledger(&slug, &ledger)?;
    remember_ledger(ctx, &slug)?;
    Ok(())
}

pub fn settle_all(ctx: &mut CliContext, args: &[String]) -> Result<(), CoreError> {
    let mut rest = args.to_vec();
    let viewer_name = extract_flag_value(&mut rest, "--viewer")
        .unwrap_or_else(|| ctx.config.viewer_name.clone());
    let slug = required(rest.first(), "settle-all <ledger> <member> [--viewer <name>]")?;
    let other = required(rest.get(1), "settle-all <ledger> <member> [--viewer <name>]")?;

    let mut ledger = ctx.storage.load_ledger(&slug)?;
    let viewer_id = resolve_viewer(ctx, &slug, &mut ledger, &viewer_name)?;
    let other_id = member_id_by_name(&ledger, &other)?;

    let settled = SettlementService::settle_all(&mut ledger, viewer_id, other_id);
    if settled == 0 {
        output::notice(&format!("`{other}` has no outstanding debts to you"));
    } else {
        output::success(&format!(
            "Marked {settled} expense share(s) from `{other}` as repaid"
        ));
        ctx.storage.save_ledger(&slug, &ledger)?;
    }
    remember_ledger(ctx, &slug)?;
    Ok(())
}

pub fn warnings(ctx: &mut CliContext, args: &[String]) -> Result<(), CoreError> {
    let slug = required(args.first(), "warnings <ledger>")?;
    let ledger = ctx.storage.load_ledger(&slug)?;
    let warnings = ledger_warnings(&ledger);
    if warnings.is_empty() {
        output::success("No stale references found");
    } else {
        for warning in &warnings {
            output::notice(warning);
        }
    }
    Ok(())
}

/// Finds the viewer's member id, resolving the self sentinel on first
/// contact and persisting the rewritten ledger.
fn resolve_viewer(
    ctx: &CliContext,
    slug: &str,
    ledger: &mut Ledger,
    viewer_name: &str,
) -> Result<Uuid, CoreError> {
    let member = ledger
        .member_by_name(viewer_name)
        .ok_or_else(|| CoreError::MemberNotFound(viewer_name.to_string()))?;
    if member.id != SELF_SENTINEL {
        return Ok(member.id);
    }
    let viewer_id = Uuid::new_v4();
    normalize_ledger(ledger, viewer_id);
    ctx.storage.save_ledger(slug, ledger)?;
    tracing::info!(ledger = %slug, "resolved self sentinel to a real member id");
    Ok(viewer_id)
}

fn parse_expense(ledger: &Ledger, args: &mut Vec<String>) -> Result<Expense, CoreError> {
    let payer_name = extract_flag_value(args, "--payer")
        .ok_or_else(|| usage_error("expense add requires --payer <name>"))?;
    let amount_raw = extract_flag_value(args, "--amount")
        .ok_or_else(|| usage_error("expense add requires --amount <minor-units>"))?;
    let split_raw = extract_flag_value(args, "--split").unwrap_or_else(|| "equal".into());
    let with_raw = extract_flag_value(args, "--with");
    let shares_raw = extract_flag_value(args, "--share");
    let description = extract_flag_value(args, "--desc").unwrap_or_default();
    let date = match extract_flag_value(args, "--date") {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|err| usage_error(&format!("invalid --date `{raw}`: {err}")))?,
        None => chrono::Local::now().date_naive(),
    };

    let payer_id = member_id_by_name(ledger, &payer_name)?;
    let amount = parse_amount(&amount_raw)?;

    let (split, participants) = match split_raw.as_str() {
        "equal" | "loan" => {
            let with = with_raw
                .ok_or_else(|| usage_error("equal and loan splits require --with <names>"))?;
            let mut participants = Vec::new();
            for name in with.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                participants.push(member_id_by_name(ledger, name)?);
            }
            let split = if split_raw == "equal" {
                SplitMode::Equal
            } else {
                SplitMode::SingleParty
            };
            (split, participants)
        }
        "exact" => {
            let raw = shares_raw
                .ok_or_else(|| usage_error("exact splits require --share name=amount,..."))?;
            let mut shares = BTreeMap::new();
            let mut participants = Vec::new();
            for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let (name, value) = pair
                    .split_once('=')
                    .ok_or_else(|| usage_error(&format!("malformed share `{pair}`")))?;
                let member_id = member_id_by_name(ledger, name.trim())?;
                shares.insert(member_id, parse_amount(value.trim())?);
                participants.push(member_id);
            }
            (SplitMode::Exact(shares), participants)
        }
        other => {
            return Err(usage_error(&format!(
                "unknown split `{other}`, expected equal, exact, or loan"
            )))
        }
    };

    Ok(Expense::new(
        amount,
        payer_id,
        split,
        participants,
        date,
        description,
    )?)
}

fn member_id_by_name(ledger: &Ledger, name: &str) -> Result<Uuid, CoreError> {
    ledger
        .member_by_name(name)
        .map(|m| m.id)
        .ok_or_else(|| CoreError::MemberNotFound(name.to_string()))
}

fn expense_id_by_prefix(ledger: &Ledger, prefix: &str) -> Result<Uuid, CoreError> {
    let matches: Vec<Uuid> = ledger
        .expenses
        .iter()
        .map(|e| e.id)
        .filter(|id| id.to_string().starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CoreError::InvalidOperation(format!(
            "no expense id starts with `{prefix}`"
        ))),
        _ => Err(CoreError::InvalidOperation(format!(
            "expense id prefix `{prefix}` is ambiguous"
        ))),
    }
}

fn parse_amount(raw: &str) -> Result<MinorUnits, CoreError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '_').collect();
    cleaned
        .parse::<MinorUnits>()
        .map_err(|_| usage_error(&format!("invalid amount `{raw}`")))
}

fn remember_ledger(ctx: &mut CliContext, slug: &str) -> Result<(), CoreError> {
    if ctx.config.last_opened_ledger.as_deref() != Some(slug) {
        ctx.config.last_opened_ledger = Some(slug.to_string());
        ctx.save_config()?;
    }
    Ok(())
}

fn required(value: Option<&String>, usage: &str) -> Result<String, CoreError> {
    value
        .cloned()
        .ok_or_else(|| usage_error(&format!("usage: divvy_cli {usage}")))
}

fn usage_error(message: &str) -> CoreError {
    CoreError::InvalidOperation(message.to_string())
}
