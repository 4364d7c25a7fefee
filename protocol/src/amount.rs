//! # Amounts and the Infinite-Allowance Sentinel
//!
//! All balances, allowances and supplies are [`Amount`]s in the token's
//! smallest unit. There is no decimal arithmetic anywhere in the ledger; the
//! `decimals` field of [`crate::WrapperConfig`] is display metadata.
//!
//! An allowance of exactly [`INFINITE_ALLOWANCE`] means "unlimited" and is
//! never decremented by spending. The only place that decides whether a
//! spend touches the stored allowance is [`spend_allowance`].

/// Unsigned integer type for every token quantity.
pub type Amount = u128;

/// Allowance value that is never decremented by `transfer_from`.
pub const INFINITE_ALLOWANCE: Amount = Amount::MAX;

/// Returns `true` if `allowance` is the unlimited sentinel.
pub fn is_infinite(allowance: Amount) -> bool {
    allowance == INFINITE_ALLOWANCE
}

/// Computes the allowance left after spending `amount` of it.
///
/// Returns `None` when `amount` exceeds `current`. An unlimited allowance
/// comes back unchanged.
pub fn spend_allowance(current: Amount, amount: Amount) -> Option<Amount> {
    if is_infinite(current) {
        return Some(current);
    }
    current.checked_sub(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_allowance_decrements_exactly() {
        assert_eq!(spend_allowance(150, 100), Some(50));
        assert_eq!(spend_allowance(100, 100), Some(0));
    }

    #[test]
    fn overspend_is_rejected() {
        assert_eq!(spend_allowance(99, 100), None);
        assert_eq!(spend_allowance(0, 1), None);
    }

    #[test]
    fn infinite_allowance_never_moves() {
        assert_eq!(
            spend_allowance(INFINITE_ALLOWANCE, 1),
            Some(INFINITE_ALLOWANCE)
        );
        assert_eq!(
            spend_allowance(INFINITE_ALLOWANCE, Amount::MAX),
            Some(INFINITE_ALLOWANCE)
        );
    }

    #[test]
    fn one_below_sentinel_is_finite() {
        let almost = INFINITE_ALLOWANCE - 1;
        assert!(!is_infinite(almost));
        assert_eq!(spend_allowance(almost, 1), Some(almost - 1));
    }
}
