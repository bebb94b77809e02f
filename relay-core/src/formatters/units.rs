//! Unit scaling for numeric quantities.
//!
//! A quantity arrives as a raw integer (or decimal) in some base unit, e.g.
//! milliwatts. It is displayed with the largest SI prefix that keeps the
//! magnitude at or above one, always with two decimals.

use rust_decimal::Decimal;

/// Rendered in place of a missing or unparsable quantity.
pub const PLACEHOLDER: &str = "N/A";

/// SI prefixes from smallest to largest, keyed by power of ten.
const PREFIXES: &[(i32, &str)] = &[
    (-6, "µ"),
    (-3, "m"),
    (0, ""),
    (3, "k"),
    (6, "M"),
    (9, "G"),
    (12, "T"),
];

/// The unit a raw quantity is expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub symbol: String,
    /// Power of ten of one raw unit relative to the base symbol.
    pub exponent: i32,
}

impl Unit {
    pub fn new(symbol: impl Into<String>, exponent: i32) -> Self {
        Self {
            symbol: symbol.into(),
            exponent,
        }
    }

    pub fn milliwatts() -> Self {
        Self::new("W", -3)
    }

    pub fn grams() -> Self {
        Self::new("g", 0)
    }

    pub fn micro_alpha() -> Self {
        Self::new("alpha", -6)
    }

    /// Unit for a grid attribute name.
    pub fn for_attribute(attribute: &str) -> Self {
        match attribute {
            "capacity" | "load" | "power" | "allocation" | "connection_capacity"
            | "connection_load" => Self::milliwatts(),
            "ore" | "fuel" => Self::grams(),
            _ => Self::new("", 0),
        }
    }

    /// Unit for a ledger denomination.
    pub fn for_denom(denom: &str) -> Self {
        match denom {
            "ualpha" => Self::micro_alpha(),
            "ore" => Self::grams(),
            other => Self::new(other, 0),
        }
    }

    /// `"500.00 mW"`-style rendering of a raw value.
    pub fn format(&self, value: Decimal) -> String {
        let (power, prefix) = self.prefix_for(value.abs());
        let Some(scaled) = self.scale_for(power).and_then(|p| value.checked_div(p)) else {
            return PLACEHOLDER.to_owned();
        };
        let rendered = format!("{:.2} {}{}", scaled.round_dp(2), prefix, self.symbol);
        rendered.trim_end().to_owned()
    }

    /// Like [`Unit::format`] but `None` renders as [`PLACEHOLDER`].
    pub fn format_opt(&self, value: Option<Decimal>) -> String {
        value.map_or_else(|| PLACEHOLDER.to_owned(), |v| self.format(v))
    }

    /// Renders a difference with an explicit sign.
    pub fn format_signed(&self, value: Decimal) -> String {
        let rendered = self.format(value);
        if value.is_sign_positive() && !value.is_zero() && rendered != PLACEHOLDER {
            format!("+{rendered}")
        } else {
            rendered
        }
    }

    /// Raw units per one `10^power` of the base symbol.
    fn scale_for(&self, power: i32) -> Option<Decimal> {
        power.checked_sub(self.exponent).and_then(pow10)
    }

    fn prefix_for(&self, magnitude: Decimal) -> (i32, &'static str) {
        let mut candidates = PREFIXES
            .iter()
            .copied()
            .filter(|(power, _)| *power >= self.exponent);
        let Some(smallest) = candidates.next() else {
            return (self.exponent, "");
        };
        candidates
            .take_while(|(power, _)| {
                self.scale_for(*power).is_some_and(|threshold| magnitude >= threshold)
            })
            .last()
            .unwrap_or(smallest)
    }
}

/// `10^power`, or `None` when it does not fit a `Decimal`.
fn pow10(power: i32) -> Option<Decimal> {
    let digits = power.unsigned_abs();
    if power >= 0 {
        let mantissa = 10i128.checked_pow(digits)?;
        Decimal::try_from_i128_with_scale(mantissa, 0).ok()
    } else {
        Decimal::try_from_i128_with_scale(1, digits).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_milliwatts_pick_largest_prefix() {
        let unit = Unit::milliwatts();
        assert_eq!(unit.format(dec("300")), "300.00 mW");
        assert_eq!(unit.format(dec("1000")), "1.00 W");
        assert_eq!(unit.format(dec("1500000")), "1.50 kW");
        assert_eq!(unit.format(dec("2500000000")), "2.50 MW");
        assert_eq!(unit.format(dec("999")), "999.00 mW");
    }

    #[test]
    fn test_tera_is_the_ceiling() {
        let unit = Unit::grams();
        assert_eq!(unit.format(dec("1000000000000")), "1.00 Tg");
        assert_eq!(unit.format(dec("5000000000000000")), "5000.00 Tg");
    }

    #[test]
    fn test_small_values_stay_at_the_raw_unit() {
        assert_eq!(Unit::milliwatts().format(dec("0")), "0.00 mW");
        assert_eq!(Unit::milliwatts().format(dec("0.5")), "0.50 mW");
        assert_eq!(Unit::micro_alpha().format(dec("12")), "12.00 µalpha");
    }

    #[test]
    fn test_micro_alpha() {
        let unit = Unit::for_denom("ualpha");
        assert_eq!(unit.format(dec("2500000")), "2.50 alpha");
        assert_eq!(unit.format(dec("1500")), "1.50 malpha");
    }

    #[test]
    fn test_negative_values_scale_by_magnitude() {
        assert_eq!(Unit::milliwatts().format(dec("-2000")), "-2.00 W");
        assert_eq!(Unit::milliwatts().format_signed(dec("-200")), "-200.00 mW");
        assert_eq!(Unit::milliwatts().format_signed(dec("200")), "+200.00 mW");
        assert_eq!(Unit::milliwatts().format_signed(dec("0")), "0.00 mW");
    }

    #[test]
    fn test_missing_value_is_placeholder() {
        assert_eq!(Unit::grams().format_opt(None), PLACEHOLDER);
        assert_eq!(Unit::grams().format_opt(Some(dec("7"))), "7.00 g");
    }

    #[test]
    fn test_unknown_denom_uses_its_name() {
        assert_eq!(Unit::for_denom("token").format(dec("42")), "42.00 token");
        assert_eq!(Unit::for_attribute("slots").format(dec("2048")), "2.05 k");
    }

    #[test]
    fn test_powers_of_ten() {
        assert_eq!(pow10(0), Some(Decimal::ONE));
        assert_eq!(pow10(3), Some(dec("1000")));
        assert_eq!(pow10(-6), Some(dec("0.000001")));
        assert_eq!(pow10(29), None);
        assert_eq!(pow10(-29), None);
    }

    #[test]
    fn test_extreme_units_do_not_panic() {
        assert_eq!(Unit::new("x", 40).format(dec("5")), "5.00 x");
        assert_eq!(Unit::new("y", -40).format(dec("5")), PLACEHOLDER);
    }
}
