//! Shared helpers for budgeting primitives.

/// Number of minor currency units in one major display unit (1 man = 10,000 yen).
pub const YEN_PER_MAN: i64 = 10_000;

/// Largest amount accepted for a single transaction or cap (2^53 - 1, the
/// largest integer a JSON number carries exactly).
pub const MAX_AMOUNT_YEN: i64 = 9_007_199_254_740_991;

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Converts a cap expressed in man into minor currency units.
pub fn man_to_yen(man: f64) -> i64 {
    if !man.is_finite() {
        return 0;
    }
    (man * YEN_PER_MAN as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn man_to_yen_scales_and_rounds() {
        assert_eq!(man_to_yen(5.0), 50_000);
        assert_eq!(man_to_yen(1.25), 12_500);
        assert_eq!(man_to_yen(0.00004), 0);
        assert_eq!(man_to_yen(f64::NAN), 0);
    }
}
