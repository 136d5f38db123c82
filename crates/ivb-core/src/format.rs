use ivb_domain::{UnitMode, YEN_PER_MAN};

const MINOR_SUFFIX: &str = "円";
const MAJOR_SUFFIX: &str = "万";

/// Formats minor-unit amounts for presentation.
pub trait MoneyFormatter {
    fn format_amount(&self, yen: i64) -> String;
}

impl MoneyFormatter for UnitMode {
    fn format_amount(&self, yen: i64) -> String {
        format_money(yen, *self)
    }
}

/// Renders `yen` in the requested display unit.
///
/// Minor units are grouped by thousands (`-1,234,567 円`). Major units divide
/// by 10,000 and show two decimals only when the value is fractional
/// (`5 万`, `1.25 万`).
pub fn format_money(yen: i64, mode: UnitMode) -> String {
    match mode {
        UnitMode::Minor => format!("{} {}", group_thousands(yen), MINOR_SUFFIX),
        UnitMode::Major => {
            let value = yen as f64 / YEN_PER_MAN as f64;
            let body = if yen % YEN_PER_MAN == 0 {
                format!("{:.0}", value)
            } else {
                format!("{:.2}", value)
            };
            format!("{} {}", body, MAJOR_SUFFIX)
        }
    }
}

/// Renders a usage percentage with one decimal place.
pub fn format_rate(rate: f64) -> String {
    if rate.is_finite() {
        format!("{:.1}%", rate)
    } else {
        "0.0%".into()
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_are_grouped() {
        assert_eq!(format_money(0, UnitMode::Minor), "0 円");
        assert_eq!(format_money(999, UnitMode::Minor), "999 円");
        assert_eq!(format_money(1_000, UnitMode::Minor), "1,000 円");
        assert_eq!(format_money(1_234_567, UnitMode::Minor), "1,234,567 円");
        assert_eq!(format_money(-185_000, UnitMode::Minor), "-185,000 円");
    }

    #[test]
    fn major_units_drop_decimals_when_integral() {
        assert_eq!(format_money(50_000, UnitMode::Major), "5 万");
        assert_eq!(format_money(12_500, UnitMode::Major), "1.25 万");
        assert_eq!(format_money(-5_000, UnitMode::Major), "-0.50 万");
        assert_eq!(UnitMode::Major.format_amount(0), "0 万");
    }

    #[test]
    fn rate_has_one_decimal() {
        assert_eq!(format_rate(7.5), "7.5%");
        assert_eq!(format_rate(0.0), "0.0%");
        assert_eq!(format_rate(f64::NAN), "0.0%");
    }
}
