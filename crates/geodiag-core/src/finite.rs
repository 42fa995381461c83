//! Serde helpers for floats that may not be finite.
//!
//! JSON has no NaN or infinity. Non-finite values are written as the string
//! `"unknown"` and read back as NaN, so a record always serializes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const UNKNOWN: &str = "unknown";

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Text(String),
}

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(UNKNOWN)
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    from_repr(Repr::deserialize(deserializer)?)
}

fn from_repr<E: serde::de::Error>(repr: Repr) -> Result<f64, E> {
    match repr {
        Repr::Number(v) => Ok(v),
        Repr::Text(s) if s == UNKNOWN => Ok(f64::NAN),
        Repr::Text(s) => Err(E::custom(format!("expected number or \"{}\", got {:?}", UNKNOWN, s))),
    }
}

/// Serializes like a bare `f64` field marked `with = "finite"`.
struct Finite(f64);

impl Serialize for Finite {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(&self.0, serializer)
    }
}

/// Same treatment for `Option<f64>`; `None` stays `null`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Option::<Repr>::deserialize(deserializer)?.map(from_repr).transpose()
    }
}

/// Same treatment for `(f64, f64)` pairs, written as two-element arrays.
pub mod pair {
    use super::*;
    use serde::ser::SerializeTuple;

    pub fn serialize<S: Serializer>(value: &(f64, f64), serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&Finite(value.0))?;
        tuple.serialize_element(&Finite(value.1))?;
        tuple.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(f64, f64), D::Error> {
        let (a, b) = <(Repr, Repr)>::deserialize(deserializer)?;
        Ok((from_repr(a)?, from_repr(b)?))
    }
}

/// `Some(v)` only when `v` is finite.
pub fn clean(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "crate::finite")]
        v: f64,
        #[serde(with = "crate::finite::option", default)]
        o: Option<f64>,
    }

    #[test]
    fn test_non_finite_becomes_unknown() {
        let json = serde_json::to_string(&Sample { v: f64::INFINITY, o: Some(f64::NAN) }).unwrap();
        assert_eq!(json, r#"{"v":"unknown","o":"unknown"}"#);
        let back: Sample = serde_json::from_str(&json).unwrap();
        assert!(back.v.is_nan());
    }

    #[derive(Serialize, Deserialize)]
    struct Fences {
        #[serde(with = "crate::finite::pair")]
        bounds: (f64, f64),
    }

    #[test]
    fn test_pair_marks_each_side() {
        let json = serde_json::to_string(&Fences { bounds: (f64::NEG_INFINITY, 2.5) }).unwrap();
        assert_eq!(json, r#"{"bounds":["unknown",2.5]}"#);
        let back: Fences = serde_json::from_str(&json).unwrap();
        assert!(back.bounds.0.is_nan());
        assert_eq!(back.bounds.1, 2.5);
    }

    #[test]
    fn test_clean() {
        assert_eq!(super::clean(1.5), Some(1.5));
        assert_eq!(super::clean(f64::NAN), None);
    }

    #[test]
    fn test_finite_passthrough() {
        let json = serde_json::to_string(&Sample { v: 0.25, o: None }).unwrap();
        assert_eq!(json, r#"{"v":0.25,"o":null}"#);
        assert!(serde_json::from_str::<Sample>(r#"{"v":"abc"}"#).is_err());
    }
}
