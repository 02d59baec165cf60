//! Shared traits and minor-unit amount arithmetic.

use uuid::Uuid;

/// Amounts are integer minor units of the ledger's currency.
pub type MinorUnits = i64;

/// Exposes a stable identifier for entities stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Divides `amount` into `count` equal shares, rounding half-up once.
///
/// Fractional minor units cannot be represented, so every share carries the
/// same rounded value; callers treat the remainder as rounding tolerance.
/// A zero or negative divisor yields 0 rather than panicking.
pub fn split_round_half_up(amount: MinorUnits, count: i64) -> MinorUnits {
    if count <= 0 {
        return 0;
    }
    (amount + count / 2) / count
}
