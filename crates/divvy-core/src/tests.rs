use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    balance_service::BalanceService,
    expense_service::ExpenseService,
    identity::{normalize_ledger, reassign_member, SELF_SENTINEL},
    member_service::MemberService,
    settlement_service::{SettleOutcome, SettlementService},
    storage::ledger_warnings,
    summary_service::SummaryService,
    CoreError,
};
use divvy_domain::{Expense, Ledger, Member, SplitMode};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

/// Ledger with one equal dinner: A paid 300_000 shared by A, B, C.
fn dinner_ledger() -> (Ledger, Uuid, Uuid, Uuid, Uuid) {
    let mut ledger = Ledger::new("Trip");
    let a = ledger.add_member(Member::new("Ana"));
    let b = ledger.add_member(Member::new("Ben"));
    let c = ledger.add_member(Member::new("Cleo"));
    let expense =
        Expense::new(300_000, a, SplitMode::Equal, vec![a, b, c], date(1), "dinner").unwrap();
    let expense_id = ExpenseService::add(&mut ledger, expense).unwrap();
    (ledger, a, b, c, expense_id)
}

#[test]
fn equal_split_bilateral_balances() {
    let (ledger, a, b, _c, expense_id) = dinner_ledger();
    let expense = ledger.expense(expense_id).unwrap();
    assert_eq!(BalanceService::share_of(expense, b), 100_000);
    assert_eq!(BalanceService::bilateral_balance(&ledger, a, b), 100_000);
    assert_eq!(BalanceService::bilateral_balance(&ledger, b, a), -100_000);
}

#[test]
fn bilateral_balance_is_skew_symmetric() {
    let mut ledger = Ledger::new("Mixed");
    let a = ledger.add_member(Member::new("Ana"));
    let b = ledger.add_member(Member::new("Ben"));
    let c = ledger.add_member(Member::new("Cleo"));
    let equal = Expense::new(90_000, a, SplitMode::Equal, vec![a, b, c], date(1), "").unwrap();
    let loan = Expense::new(40_000, b, SplitMode::SingleParty, vec![b, a], date(2), "").unwrap();
    let shares = BTreeMap::from([(a, 10_000), (c, 20_000)]);
    let exact = Expense::new(30_000, b, SplitMode::Exact(shares), vec![a, c], date(3), "").unwrap();
    for expense in [equal, loan, exact] {
        ExpenseService::add(&mut ledger, expense).unwrap();
    }

    let ids = [a, b, c];
    for x in ids {
        for y in ids {
            assert_eq!(
                BalanceService::bilateral_balance(&ledger, x, y),
                -BalanceService::bilateral_balance(&ledger, y, x),
            );
        }
    }
}

#[test]
fn aggregate_does_not_offset_across_counterparties() {
    let mut ledger = Ledger::new("NoOffset");
    let viewer = ledger.add_member(Member::new("Viewer"));
    let debtor = ledger.add_member(Member::new("Debtor"));
    let creditor = ledger.add_member(Member::new("Creditor"));
    let owed_to_viewer = Expense::new(
        50_000,
        viewer,
        SplitMode::SingleParty,
        vec![debtor],
        date(1),
        "",
    )
    .unwrap();
    let owed_by_viewer = Expense::new(
        30_000,
        creditor,
        SplitMode::SingleParty,
        vec![viewer],
        date(2),
        "",
    )
    .unwrap();
    ExpenseService::add(&mut ledger, owed_to_viewer).unwrap();
    ExpenseService::add(&mut ledger, owed_by_viewer).unwrap();

    let sheet = BalanceService::aggregate_balances(&ledger, viewer);
    assert_eq!(sheet.receivable, 50_000);
    assert_eq!(sheet.payable, 30_000);
    assert_eq!(sheet.net, 20_000);
}

#[test]
fn counterparty_balances_sorts_largest_receivable_first() {
    let mut ledger = Ledger::new("Rows");
    let viewer = ledger.add_member(Member::new("Viewer"));
    let small = ledger.add_member(Member::new("Small"));
    let big = ledger.add_member(Member::new("Big"));
    let quiet = ledger.add_member(Member::new("Quiet"));
    let e1 =
        Expense::new(10_000, viewer, SplitMode::SingleParty, vec![small], date(1), "").unwrap();
    let e2 = Expense::new(80_000, viewer, SplitMode::SingleParty, vec![big], date(2), "").unwrap();
    ExpenseService::add(&mut ledger, e1).unwrap();
    ExpenseService::add(&mut ledger, e2).unwrap();

    let rows = BalanceService::counterparty_balances(&ledger, viewer);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].member_id, big);
    assert_eq!(rows[1].member_id, small);
    assert!(rows.iter().all(|row| row.member_id != quiet));
}

#[test]
fn settle_toggles_and_zeroes_the_balance() {
    let (mut ledger, a, b, _c, expense_id) = dinner_ledger();

    let outcome = SettlementService::settle(&mut ledger, expense_id, b);
    assert_eq!(outcome, SettleOutcome::Settled);
    assert!(ledger.expense(expense_id).unwrap().is_settled_by(b));
    assert_eq!(BalanceService::bilateral_balance(&ledger, a, b), 0);

    let outcome = SettlementService::settle(&mut ledger, expense_id, b);
    assert_eq!(outcome, SettleOutcome::Unsettled);
    assert_eq!(BalanceService::bilateral_balance(&ledger, a, b), 100_000);
}

#[test]
fn settle_double_toggle_restores_the_ledger() {
    let (mut ledger, _a, b, _c, expense_id) = dinner_ledger();
    let original = ledger.expense(expense_id).unwrap().settled_by.clone();

    SettlementService::settle(&mut ledger, expense_id, b);
    SettlementService::settle(&mut ledger, expense_id, b);

    assert_eq!(ledger.expense(expense_id).unwrap().settled_by, original);
}

#[test]
fn settle_tolerates_stale_references() {
    let (mut ledger, a, _b, _c, expense_id) = dinner_ledger();
    let snapshot = ledger.clone();

    assert_eq!(
        SettlementService::settle(&mut ledger, Uuid::new_v4(), a),
        SettleOutcome::Skipped
    );
    assert_eq!(
        SettlementService::settle(&mut ledger, expense_id, Uuid::new_v4()),
        SettleOutcome::Skipped
    );
    assert_eq!(ledger, snapshot);
}

#[test]
fn settle_all_is_idempotent() {
    let (mut ledger, a, b, _c, _expense_id) = dinner_ledger();
    let second =
        Expense::new(60_000, a, SplitMode::SingleParty, vec![b], date(2), "loan").unwrap();
    ExpenseService::add(&mut ledger, second).unwrap();

    assert_eq!(SettlementService::settle_all(&mut ledger, a, b), 2);
    assert_eq!(BalanceService::bilateral_balance(&ledger, a, b), 0);

    let after_first = ledger.clone();
    assert_eq!(SettlementService::settle_all(&mut ledger, a, b), 0);
    assert_eq!(ledger, after_first);
}

#[test]
fn settle_all_never_touches_debts_the_viewer_owes() {
    let mut ledger = Ledger::new("Direction");
    let viewer = ledger.add_member(Member::new("Viewer"));
    let other = ledger.add_member(Member::new("Other"));
    let owed_by_viewer =
        Expense::new(10_000, other, SplitMode::SingleParty, vec![viewer], date(1), "").unwrap();
    ExpenseService::add(&mut ledger, owed_by_viewer).unwrap();

    assert_eq!(SettlementService::settle_all(&mut ledger, viewer, other), 0);
    assert_eq!(
        BalanceService::bilateral_balance(&ledger, viewer, other),
        -10_000
    );
}

#[test]
fn merge_settlements_keeps_both_concurrent_writes() {
    let (base, _a, b, c, expense_id) = dinner_ledger();

    let mut ours = base.clone();
    SettlementService::settle(&mut ours, expense_id, b);
    let mut theirs = base.clone();
    SettlementService::settle(&mut theirs, expense_id, c);

    SettlementService::merge_settlements(&mut ours, &theirs);
    let merged = ours.expense(expense_id).unwrap();
    assert!(merged.is_settled_by(b));
    assert!(merged.is_settled_by(c));
}

#[test]
fn merge_settlements_ignores_non_participants_and_unknown_expenses() {
    let (mut base, _a, b, _c, expense_id) = dinner_ledger();
    let mut theirs = base.clone();
    let stranger = Uuid::new_v4();
    theirs
        .expense_mut(expense_id)
        .unwrap()
        .settled_by
        .insert(stranger);
    theirs.expenses.push(
        Expense::new(100, b, SplitMode::Equal, vec![b], date(3), "unsynced").unwrap(),
    );

    SettlementService::merge_settlements(&mut base, &theirs);
    assert!(!base.expense(expense_id).unwrap().is_settled_by(stranger));
    assert_eq!(base.expense_count(), 1);
}

#[test]
fn balances_skip_members_no_longer_in_the_roster() {
    let (mut ledger, a, b, _c, _expense_id) = dinner_ledger();
    let ghost = Uuid::new_v4();
    assert_eq!(BalanceService::bilateral_balance(&ledger, a, ghost), 0);

    // Pruning B strips their share; the dinner re-divides among survivors.
    MemberService::remove(&mut ledger, b).unwrap();
    assert_eq!(BalanceService::bilateral_balance(&ledger, a, b), 0);
    let sheet = BalanceService::aggregate_balances(&ledger, a);
    assert_eq!(sheet.receivable, 150_000);
}

#[test]
fn expense_update_revalidates_and_keeps_settlements() {
    let (mut ledger, a, b, c, expense_id) = dinner_ledger();
    SettlementService::settle(&mut ledger, expense_id, b);

    let mut edited = ledger.expense(expense_id).unwrap().clone();
    edited.amount = 150_000;
    edited.participants = vec![a, b];
    edited.settled_by.clear();
    ExpenseService::update(&mut ledger, edited).unwrap();

    let stored = ledger.expense(expense_id).unwrap();
    assert_eq!(stored.amount, 150_000);
    assert!(stored.is_settled_by(b));
    assert!(!stored.is_settled_by(c));

    let mut broken = stored.clone();
    broken.amount = 0;
    assert!(matches!(
        ExpenseService::update(&mut ledger, broken),
        Err(CoreError::Validation(_))
    ));
}

#[test]
fn member_service_rejects_duplicates() {
    let mut ledger = Ledger::new("Roster");
    MemberService::add(&mut ledger, Member::new("Ana")).unwrap();
    let err = MemberService::add(&mut ledger, Member::new("ana")).unwrap_err();
    assert!(matches!(err, CoreError::InvalidOperation(_)));
}

#[test]
fn normalize_ledger_resolves_the_self_sentinel() {
    let mut ledger = Ledger::new("Sentinel");
    ledger.add_member(Member::with_id(SELF_SENTINEL, "Me"));
    let friend = ledger.add_member(Member::new("Friend"));
    let shares = BTreeMap::from([(SELF_SENTINEL, 30_000), (friend, 70_000)]);
    let mut expense = Expense::new(
        100_000,
        SELF_SENTINEL,
        SplitMode::Exact(shares),
        vec![SELF_SENTINEL, friend],
        date(1),
        "pre-login",
    )
    .unwrap();
    expense.settled_by.insert(SELF_SENTINEL);
    ledger.add_expense(expense).unwrap();

    let viewer = Uuid::new_v4();
    normalize_ledger(&mut ledger, viewer);

    assert!(ledger.has_member(viewer));
    assert!(!ledger.has_member(SELF_SENTINEL));
    let expense = &ledger.expenses[0];
    assert_eq!(expense.payer_id, viewer);
    assert_eq!(expense.participants, vec![viewer, friend]);
    assert!(expense.is_settled_by(viewer));
    assert_eq!(expense.share_of(viewer), 30_000);
    assert!(ledger_warnings(&ledger).is_empty());
}

#[test]
fn reassign_member_collapses_duplicate_shares() {
    let mut ledger = Ledger::new("Merge");
    let provisional = ledger.add_member(Member::new("Ghost Ben"));
    let real = ledger.add_member(Member::new("Ben"));
    let payer = ledger.add_member(Member::new("Ana"));
    let shares = BTreeMap::from([(provisional, 40_000), (real, 60_000)]);
    let expense = Expense::new(
        100_000,
        payer,
        SplitMode::Exact(shares),
        vec![provisional, real],
        date(1),
        "",
    )
    .unwrap();
    ledger.add_expense(expense).unwrap();

    reassign_member(&mut ledger, provisional, real);

    assert_eq!(ledger.member_count(), 2);
    let expense = &ledger.expenses[0];
    assert_eq!(expense.participants, vec![real]);
    // Colliding shares are summed so the exact split still covers the amount.
    assert_eq!(expense.share_of(real), 100_000);
    assert!(expense.validate().is_ok());
}

#[test]
fn global_balances_merge_counterparties_across_ledgers() {
    let viewer = Uuid::new_v4();
    let friend = Uuid::new_v4();

    let mut trip = Ledger::new("Trip");
    trip.add_member(Member::with_id(viewer, "Me"));
    trip.add_member(Member::with_id(friend, "Ben"));
    let owed_to_me =
        Expense::new(50_000, viewer, SplitMode::SingleParty, vec![friend], date(1), "").unwrap();
    trip.add_expense(owed_to_me).unwrap();

    let mut flat = Ledger::new("Flat");
    flat.add_member(Member::with_id(viewer, "Me"));
    flat.add_member(Member::with_id(friend, "Ben"));
    let owed_by_me =
        Expense::new(20_000, friend, SplitMode::SingleParty, vec![viewer], date(2), "").unwrap();
    flat.add_expense(owed_by_me).unwrap();

    let summary = SummaryService::global_balances(&[trip, flat], viewer);
    assert_eq!(summary.counterparties.len(), 1);
    assert_eq!(summary.counterparties[0].amount, 30_000);
    assert_eq!(summary.totals.receivable, 30_000);
    assert_eq!(summary.totals.payable, 0);
    assert_eq!(summary.totals.net, 30_000);
}

#[test]
fn related_expenses_filters_and_sorts_by_date() {
    let mut ledger = Ledger::new("History");
    let viewer = ledger.add_member(Member::new("Me"));
    let a = ledger.add_member(Member::new("Ana"));
    let b = ledger.add_member(Member::new("Ben"));
    let old = Expense::new(100, viewer, SplitMode::Equal, vec![viewer, a], date(1), "old").unwrap();
    let unrelated = Expense::new(200, a, SplitMode::Equal, vec![a, b], date(2), "theirs").unwrap();
    let recent = Expense::new(300, a, SplitMode::Equal, vec![a, viewer], date(3), "new").unwrap();
    for expense in [old, unrelated, recent] {
        ledger.add_expense(expense).unwrap();
    }

    let history = SummaryService::related_expenses(&ledger, viewer);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].description, "new");
    assert_eq!(history[1].description, "old");
}

#[test]
fn ledger_warnings_flags_stale_references() {
    let (mut ledger, _a, b, _c, expense_id) = dinner_ledger();
    assert!(ledger_warnings(&ledger).is_empty());

    ledger.members.retain(|m| m.id != b);
    ledger
        .expense_mut(expense_id)
        .unwrap()
        .settled_by
        .insert(Uuid::new_v4());

    let warnings = ledger_warnings(&ledger);
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("unknown participant"));
    assert!(warnings[1].contains("non-participant"));
}
