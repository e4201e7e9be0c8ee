//! Exact-decimal coin amounts.
//!
//! Amounts travel as decimal strings and are summed and compared as
//! [`Decimal`]. Floating point never enters a balance or fee calculation:
//! JSON numbers are converted through their textual form.

use std::fmt;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

use crate::error::XvgError;

/// Network fee used when a build request does not name one (0.1 XVG).
pub const DEFAULT_NETWORK_FEE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Parse a non-negative decimal amount. Accepts plain and scientific notation.
///
/// Input that needs more than 28 fractional digits is rejected instead of
/// being rounded.
pub fn parse_amount(text: &str) -> Result<Decimal, XvgError> {
    let trimmed = text.trim();
    let value = match Decimal::from_str_exact(trimmed) {
        Ok(value) => value,
        Err(e) => parse_scientific_exact(trimmed)
            .ok_or_else(|| XvgError::InvalidParams(format!("invalid amount '{text}': {e}")))?,
    };
    if value.is_sign_negative() && !value.is_zero() {
        return Err(XvgError::InvalidParams(format!(
            "amount must be non-negative, got {text}"
        )));
    }
    Ok(value)
}

/// `<mantissa>e<exponent>` without rounding; `None` when not representable.
fn parse_scientific_exact(text: &str) -> Option<Decimal> {
    let (mantissa, exponent) = text.split_once(|c: char| c == 'e' || c == 'E')?;
    let mut value = Decimal::from_str_exact(mantissa).ok()?.normalize();
    let exponent: i64 = exponent.parse().ok()?;
    if value.is_zero() {
        return Some(Decimal::ZERO);
    }
    if exponent < 0 {
        let shift = u32::try_from(exponent.unsigned_abs()).ok()?;
        value.set_scale(value.scale().checked_add(shift)?).ok()?;
    } else {
        for _ in 0..exponent {
            value = value.checked_mul(Decimal::TEN)?;
        }
    }
    Some(value)
}

/// Convert a provider JSON value (string or number) into an amount.
pub fn amount_from_json(value: &serde_json::Value) -> Result<Decimal, XvgError> {
    match value {
        serde_json::Value::String(s) => parse_amount(s),
        serde_json::Value::Number(n) => parse_amount(&n.to_string()),
        other => Err(XvgError::InvalidParams(format!(
            "expected amount, got {other}"
        ))),
    }
}

/// Exact sum; overflow of the 96-bit mantissa is reported, not wrapped.
pub fn checked_sum<'a, I>(values: I) -> Result<Decimal, XvgError>
where
    I: IntoIterator<Item = &'a Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(*v)
            .ok_or_else(|| XvgError::InvalidParams("amount overflow".into()))
    })
}

/// Serde adapter: serialize as a decimal string, deserialize from a string or
/// a JSON number.
pub mod serde_amount {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative decimal amount as a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
            parse_amount(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            parse_amount(&v.to_string()).map_err(E::custom)
        }

        // Shortest round-trip text of the f64, so 0.01 stays 0.01.
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            parse_amount(&v.to_string()).map_err(E::custom)
        }
    }
}

/// Same as [`serde_amount`] for optional fields.
pub mod serde_amount_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serde_amount::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        #[derive(serde::Deserialize)]
        struct Wrapper(#[serde(with = "serde_amount")] Decimal);

        let wrapped: Option<Wrapper> = serde::Deserialize::deserialize(deserializer)?;
        Ok(wrapped.map(|Wrapper(v)| v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "serde_amount")]
        value: Decimal,
        #[serde(default, with = "serde_amount_opt")]
        fee: Option<Decimal>,
    }

    #[test]
    fn default_fee_is_one_tenth() {
        assert_eq!(DEFAULT_NETWORK_FEE, Decimal::from_str("0.1").unwrap());
        assert_eq!(DEFAULT_NETWORK_FEE.to_string(), "0.1");
    }

    #[test]
    fn parse_plain_and_scientific() {
        assert_eq!(parse_amount("1.5").unwrap(), Decimal::new(15, 1));
        assert_eq!(parse_amount(" 2 ").unwrap(), Decimal::from(2));
        assert_eq!(parse_amount("1e-8").unwrap(), Decimal::new(1, 8));
    }

    #[test]
    fn parse_never_rounds_past_28_digits() {
        // These differ only in the 30th decimal place.
        assert!(parse_amount("0.12345678901234567890123456784").is_err());
        assert!(parse_amount("0.123456789012345678901234567841").is_err());
        assert!(parse_amount("1e-29").is_err());
        assert!(parse_amount("1.5e-28").is_err());

        let smallest = parse_amount("0.0000000000000000000000000001").unwrap();
        assert_eq!(parse_amount("1e-28").unwrap(), smallest);
        assert_eq!(parse_amount("1.0e-28").unwrap(), smallest);
    }

    #[test]
    fn scientific_with_positive_exponent() {
        assert_eq!(parse_amount("2.5E3").unwrap(), Decimal::from(2500));
        assert_eq!(parse_amount("0e-40").unwrap(), Decimal::ZERO);
        assert!(parse_amount("1e40").is_err());
    }

    #[test]
    fn json_float_beyond_precision_is_rejected() {
        assert!(amount_from_json(&serde_json::json!(1e-30)).is_err());
        let h: Result<Holder, _> = serde_json::from_str(r#"{"value": 1e-30}"#);
        assert!(h.is_err());
    }

    #[test]
    fn parse_rejects_negative_and_garbage() {
        assert!(parse_amount("-0.5").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn decimal_sums_are_exact() {
        // 0.1 + 0.2 is the classic floating point trap.
        let values = [parse_amount("0.1").unwrap(), parse_amount("0.2").unwrap()];
        assert_eq!(checked_sum(&values).unwrap(), parse_amount("0.3").unwrap());
    }

    #[test]
    fn checked_sum_reports_overflow() {
        let values = [Decimal::MAX, Decimal::ONE];
        assert!(checked_sum(&values).is_err());
    }

    #[test]
    fn amount_from_json_number_and_string() {
        assert_eq!(
            amount_from_json(&serde_json::json!(0.9)).unwrap(),
            Decimal::new(9, 1)
        );
        assert_eq!(
            amount_from_json(&serde_json::json!("12.345")).unwrap(),
            Decimal::new(12345, 3)
        );
        assert!(amount_from_json(&serde_json::json!(null)).is_err());
    }

    #[test]
    fn serde_accepts_numbers_and_strings() {
        let h: Holder = serde_json::from_str(r#"{"value": "1.0", "fee": 0.01}"#).unwrap();
        assert_eq!(h.value, Decimal::new(10, 1));
        assert_eq!(h.fee, Some(Decimal::new(1, 2)));

        let h: Holder = serde_json::from_str(r#"{"value": 3}"#).unwrap();
        assert_eq!(h.value, Decimal::from(3));
        assert_eq!(h.fee, None);
    }

    #[test]
    fn serde_rejects_negative() {
        assert!(serde_json::from_str::<Holder>(r#"{"value": -1}"#).is_err());
    }

    #[test]
    fn serializes_as_string_preserving_scale() {
        let h = Holder {
            value: Decimal::new(10, 1),
            fee: None,
        };
        assert_eq!(
            serde_json::to_string(&h).unwrap(),
            r#"{"value":"1.0","fee":null}"#
        );
    }
}
