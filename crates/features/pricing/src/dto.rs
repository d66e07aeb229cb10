use fare_derive::api_model;
use serde::Deserializer;
use serde::de::{self, Unexpected, Visitor};
use std::fmt;

#[api_model]
/// Trip features used to price a ride
///
/// Values are only type-checked. Out-of-range inputs such as `hour = 27` are
/// passed to the model unchanged.
#[derive(Clone, PartialEq)]
pub struct FareRequest {
    /// Trip distance in kilometers
    #[serde(deserialize_with = "lenient_float")]
    #[schema(example = 5.0)]
    pub distance_km: f64,
    /// Number of passengers
    #[serde(deserialize_with = "lenient_int")]
    #[schema(example = 1)]
    pub passenger_count: i64,
    /// Hour of day, nominally 0-23
    #[serde(deserialize_with = "lenient_int")]
    #[schema(example = 14)]
    pub hour: i64,
    /// Day of week, nominally 0-6
    #[serde(deserialize_with = "lenient_int")]
    #[schema(example = 2)]
    pub day_of_week: i64,
    /// 1 on Saturday/Sunday, otherwise 0
    #[serde(deserialize_with = "lenient_int")]
    #[schema(example = 0)]
    pub is_weekend: i64,
    /// 1 for night trips, otherwise 0
    #[serde(deserialize_with = "lenient_int")]
    #[schema(example = 0)]
    pub is_night: i64,
}

impl FareRequest {
    /// The model input: `[distance_km, passenger_count, hour, day_of_week, is_weekend, is_night]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_features(&self) -> [f64; 6] {
        [
            self.distance_km,
            self.passenger_count as f64,
            self.hour as f64,
            self.day_of_week as f64,
            self.is_weekend as f64,
            self.is_night as f64,
        ]
    }
}

#[api_model]
/// Predicted fare
#[derive(Clone, Copy, PartialEq)]
pub struct FareEstimate {
    /// Price rounded to two decimals
    #[schema(example = 18.35)]
    pub estimated_price: f64,
}

#[api_model]
/// Request validation failure
pub struct ValidationErrorBody {
    pub detail: Vec<ValidationIssue>,
}

#[api_model]
/// One validation problem
pub struct ValidationIssue {
    /// Machine-readable kind, e.g. `missing` or `json_invalid`
    #[serde(rename = "type")]
    pub kind: String,
    /// Location of the problem, always starting with `body`
    pub loc: Vec<String>,
    /// Human-readable description
    pub msg: String,
}

/// Integers, integral floats, or strings holding either. Booleans and `null` are refused.
fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientInt)
}

/// Numbers, or strings holding a finite number.
fn lenient_float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientFloat)
}

struct LenientInt;

impl Visitor<'_> for LenientInt {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a valid integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    #[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        let whole = v.trunc() == v && v >= i64::MIN as f64 && v < i64::MAX as f64;
        if whole { Ok(v as i64) } else { Err(E::invalid_value(Unexpected::Float(v), &self)) }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        let text = v.trim();
        if let Ok(int) = text.parse::<i64>() {
            return Ok(int);
        }
        match text.parse::<f64>() {
            Ok(float) if float.is_finite() => {
                self.visit_f64::<E>(float).map_err(|_| E::invalid_value(Unexpected::Str(v), &LenientInt))
            },
            _ => Err(E::invalid_type(Unexpected::Str(v), &self)),
        }
    }
}

struct LenientFloat;

impl Visitor<'_> for LenientFloat {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a valid number")
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        match v.trim().parse::<f64>() {
            Ok(float) if float.is_finite() => Ok(float),
            _ => Err(E::invalid_type(Unexpected::Str(v), &self)),
        }
    }
}
