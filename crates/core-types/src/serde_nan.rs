//! Serde helpers for floats that may be undefined or divergent.
//!
//! JSON has no NaN or infinity. Degenerate metrics must survive a round trip
//! through storage without turning into zero or into each other, so every
//! float that may be non-finite goes through this module:
//!
//! * `NaN` is written as `null` and `null` reads back as `NaN`.
//! * `+inf` / `-inf` are written as the strings `"Infinity"` / `"-Infinity"`
//!   and read back as the matching infinity.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

const POS_INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_nan() {
        serializer.serialize_none()
    } else if *value == f64::INFINITY {
        serializer.serialize_str(POS_INFINITY)
    } else if *value == f64::NEG_INFINITY {
        serializer.serialize_str(NEG_INFINITY)
    } else {
        serializer.serialize_some(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Encoded {
    Number(f64),
    Text(String),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Encoded>::deserialize(deserializer)? {
        None => Ok(f64::NAN),
        Some(Encoded::Number(v)) => Ok(v),
        Some(Encoded::Text(s)) => match s.as_str() {
            POS_INFINITY => Ok(f64::INFINITY),
            NEG_INFINITY => Ok(f64::NEG_INFINITY),
            other => Err(D::Error::custom(format!(
                "expected a number, null, \"{}\" or \"{}\", got \"{}\"",
                POS_INFINITY, NEG_INFINITY, other
            ))),
        },
    }
}
