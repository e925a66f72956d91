//! Cache Key Derivation Module
//!
//! Builds deterministic, collision-resistant cache keys from a cache-type
//! tag plus the positional and keyword arguments of the wrapped call.
//!
//! Two calls that differ only in the order keyword arguments were supplied
//! derive the same key; two calls with different positional order derive
//! different keys. The digest is SHA-256 over a canonical JSON envelope, so
//! keys are stable across process restarts.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::CacheError;

// == Call Arguments ==
/// Normalized call identity: ordered positional values plus named values.
///
/// Values are converted into `serde_json::Value` as they are added. If any
/// value cannot be serialized, the argument set is poisoned and
/// [`derive_key`] reports a `KeyDerivation` error; the facade treats that as
/// a forced cache miss.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    args: Vec<Value>,
    // BTreeMap iterates in name order, which is what makes the derived key
    // insensitive to keyword insertion order.
    kwargs: BTreeMap<String, Value>,
    invalid: Option<String>,
}

impl CallArgs {
    // == Constructor ==
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    // == Positional Argument ==
    /// Appends a positional argument. Order is significant.
    pub fn arg(mut self, value: impl Serialize) -> Self {
        match to_strict_value(value) {
            Ok(v) => self.args.push(v),
            Err(e) => {
                if self.invalid.is_none() {
                    self.invalid = Some(format!("positional argument: {}", e));
                }
            }
        }
        self
    }

    // == Keyword Argument ==
    /// Adds a named argument. Names are significant, insertion order is not.
    ///
    /// Arguments that serialize to JSON `null` (e.g. `Option::None`) are
    /// omitted from the key, so an explicit `None` and an absent keyword
    /// derive the same key.
    pub fn kwarg(mut self, name: &str, value: impl Serialize) -> Self {
        match to_strict_value(value) {
            Ok(Value::Null) => {}
            Ok(v) => {
                self.kwargs.insert(name.to_string(), v);
            }
            Err(e) => {
                if self.invalid.is_none() {
                    self.invalid = Some(format!("keyword argument '{}': {}", name, e));
                }
            }
        }
        self
    }

    /// Returns true if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    // == Preview ==
    /// Renders a short human-readable call signature.
    ///
    /// Stored on cache documents for inspection only; lookup is always by
    /// the derived key.
    pub fn preview(&self) -> String {
        let mut parts: Vec<String> = self.args.iter().map(|v| v.to_string()).collect();
        for (name, value) in &self.kwargs {
            parts.push(format!("{}={}", name, value));
        }
        format!("({})", parts.join(", "))
    }
}

// == Strict Conversion ==
/// Converts an argument into a `Value`, rejecting what JSON cannot carry.
///
/// `serde_json::to_value` coerces non-finite floats to `null` instead of
/// erroring, which would make a NaN argument derive the same key as a null
/// argument and silently serve the wrong cached response. The value is
/// walked with [`FiniteCheck`] first so those inputs fail loudly.
fn to_strict_value(value: impl Serialize) -> serde_json::Result<Value> {
    value.serialize(FiniteCheck)?;
    serde_json::to_value(value)
}

/// Serializer that accepts everything except non-finite floats.
///
/// Produces no output; it only walks the value so `NaN` and the infinities
/// are caught anywhere in a nested structure.
struct FiniteCheck;

fn non_finite_error() -> serde_json::Error {
    serde::ser::Error::custom("non-finite float has no JSON representation")
}

impl serde::Serializer for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Result<(), Self::Error> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(non_finite_error())
        }
    }

    fn serialize_f64(self, v: f64) -> Result<(), Self::Error> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(non_finite_error())
        }
    }

    fn serialize_bool(self, _: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_char(self, _: char) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Self::Error> {
        Ok(self)
    }
}

impl serde::ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl serde::ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl serde::ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl serde::ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl serde::ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        key.serialize(FiniteCheck)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl serde::ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl serde::ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// == Canonical Envelope ==
/// Serialized form hashed into the key. Field order is fixed by the struct,
/// kwarg order by the BTreeMap.
#[derive(Serialize)]
struct KeyEnvelope<'a> {
    cache_type: &'a str,
    args: &'a [Value],
    kwargs: &'a BTreeMap<String, Value>,
}

// == Derive Key ==
/// Derives the cache key for `(cache_type, args)`.
///
/// Deterministic across processes and restarts. Returns a lowercase hex
/// SHA-256 digest; collisions are cryptographically negligible, which
/// matters because a collision would be a silent wrong cache hit.
///
/// # Errors
/// `CacheError::KeyDerivation` if any argument could not be normalized.
pub fn derive_key(cache_type: &str, args: &CallArgs) -> Result<String, CacheError> {
    if let Some(reason) = &args.invalid {
        return Err(CacheError::KeyDerivation(reason.clone()));
    }

    let envelope = KeyEnvelope {
        cache_type,
        args: &args.args,
        kwargs: &args.kwargs,
    };
    let canonical = serde_json::to_string(&envelope)
        .map_err(|e| CacheError::KeyDerivation(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();

    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        let a = CallArgs::new().arg("Tokyo, Japan").kwarg("radius", 500);
        let b = CallArgs::new().arg("Tokyo, Japan").kwarg("radius", 500);

        assert_eq!(
            derive_key("google_geocoding", &a).unwrap(),
            derive_key("google_geocoding", &b).unwrap()
        );
    }

    #[test]
    fn test_derive_key_kwarg_order_invariant() {
        let a = CallArgs::new().kwarg("a", 1).kwarg("b", 2);
        let b = CallArgs::new().kwarg("b", 2).kwarg("a", 1);

        assert_eq!(derive_key("t", &a).unwrap(), derive_key("t", &b).unwrap());
    }

    #[test]
    fn test_derive_key_positional_order_sensitive() {
        let a = CallArgs::new().arg(1).arg(2);
        let b = CallArgs::new().arg(2).arg(1);

        assert_ne!(derive_key("t", &a).unwrap(), derive_key("t", &b).unwrap());
    }

    #[test]
    fn test_derive_key_cache_type_sensitive() {
        let args = CallArgs::new().arg("Tokyo, Japan");

        assert_ne!(
            derive_key("google_geocoding", &args).unwrap(),
            derive_key("google_places_search", &args).unwrap()
        );
    }

    #[test]
    fn test_derive_key_null_kwarg_omitted() {
        let explicit_none = CallArgs::new().arg("query").kwarg("category", Option::<String>::None);
        let absent = CallArgs::new().arg("query");

        assert_eq!(
            derive_key("t", &explicit_none).unwrap(),
            derive_key("t", &absent).unwrap()
        );
    }

    #[test]
    fn test_derive_key_non_serializable_argument() {
        // NaN has no JSON representation
        let args = CallArgs::new().arg(f64::NAN);

        let result = derive_key("t", &args);
        assert!(matches!(result, Err(CacheError::KeyDerivation(_))));
    }

    #[test]
    fn test_non_finite_argument_does_not_alias_null() {
        // to_value would coerce NaN to null; a NaN argument must error
        // instead of deriving the key of a genuinely-null argument.
        let null_key = derive_key("t", &CallArgs::new().arg(Value::Null)).unwrap();
        assert!(!null_key.is_empty());

        assert!(derive_key("t", &CallArgs::new().arg(f64::NAN)).is_err());
        assert!(derive_key("t", &CallArgs::new().arg(f64::INFINITY)).is_err());
        assert!(derive_key("t", &CallArgs::new().arg(f64::NEG_INFINITY)).is_err());
    }

    #[test]
    fn test_non_finite_float_rejected_inside_structures() {
        #[derive(Serialize)]
        struct Point {
            lat: f64,
            lng: f64,
        }

        let nested = CallArgs::new().arg(Point {
            lat: f64::NAN,
            lng: 139.6503,
        });
        assert!(matches!(
            derive_key("t", &nested),
            Err(CacheError::KeyDerivation(_))
        ));

        let in_vec = CallArgs::new().arg(vec![1.0, f64::INFINITY]);
        assert!(derive_key("t", &in_vec).is_err());
    }

    #[test]
    fn test_non_finite_kwarg_poisons_instead_of_dropping() {
        // A NaN kwarg must not be treated like a None kwarg and silently
        // omitted from the key.
        let args = CallArgs::new().arg("query").kwarg("score", f64::NAN);

        assert!(matches!(
            derive_key("t", &args),
            Err(CacheError::KeyDerivation(_))
        ));
    }

    #[test]
    fn test_finite_floats_still_accepted() {
        let args = CallArgs::new().arg(35.6762).kwarg("lng", 139.6503);
        assert!(derive_key("t", &args).is_ok());
    }

    #[test]
    fn test_derive_key_nested_structures() {
        let a = CallArgs::new().arg(serde_json::json!({"lat": 35.6762, "lng": 139.6503}));
        let b = CallArgs::new().arg(serde_json::json!({"lat": 35.6762, "lng": 139.6503}));

        assert_eq!(derive_key("t", &a).unwrap(), derive_key("t", &b).unwrap());
    }

    #[test]
    fn test_derive_key_hex_format() {
        let key = derive_key("t", &CallArgs::new()).unwrap();

        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_preview_renders_args() {
        let args = CallArgs::new().arg("Tokyo, Japan").kwarg("radius", 500);

        let preview = args.preview();
        assert!(preview.contains("Tokyo, Japan"));
        assert!(preview.contains("radius=500"));
    }
}
