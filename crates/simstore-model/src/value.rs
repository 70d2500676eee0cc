//! The generic value tree every node converts to and from.
//!
//! Nodes never serialize themselves directly: they lower to a [`Value`], and
//! the text and container codecs only ever see values. Conversion in both
//! directions goes through [`ToValue`] and [`FromValue`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use num_complex::Complex64;

use crate::address::Address;
use crate::array::DataArray;
use crate::error::{ModelError, Result};
use crate::text;

/// Ordered mapping; nodes keep `"type"` first, then declaration order.
pub type Map = IndexMap<String, Value>;

/// Key under which every node stores its type tag.
pub const TYPE_KEY: &str = "type";

/// A dynamically typed model value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex64),
    Str(String),
    Array(DataArray),
    Seq(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Short name used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Complex(_) => "complex",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }

    /// The `"type"` tag of a mapping, if present and a string.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Map(map) => match map.get(TYPE_KEY) {
                Some(Self::Str(tag)) => Some(tag),
                _ => None,
            },
            _ => None,
        }
    }

    /// Follow `address` down from this value.
    pub fn get(&self, address: &Address) -> Option<&Value> {
        let mut current = self;
        for segment in address.segments() {
            current = match current {
                Self::Map(map) => map.get(segment)?,
                Self::Seq(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Visit every field below this value, depth first, with its address.
    ///
    /// The value itself is not visited; children are visited before their
    /// own children.
    pub fn walk<E>(
        &self,
        at: &Address,
        visit: &mut impl FnMut(&Address, &Value) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        match self {
            Self::Map(map) => {
                for (key, child) in map {
                    let child_at = at.child(key);
                    visit(&child_at, child)?;
                    child.walk(&child_at, visit)?;
                }
            }
            Self::Seq(items) => {
                for (index, child) in items.iter().enumerate() {
                    let child_at = at.index(index);
                    visit(&child_at, child)?;
                    child.walk(&child_at, visit)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Every array below this value, with its address.
    pub fn arrays(&self, at: &Address) -> Vec<(Address, &DataArray)> {
        let mut found = Vec::new();
        collect_arrays(self, at, &mut found);
        found
    }
}

fn collect_arrays<'a>(value: &'a Value, at: &Address, found: &mut Vec<(Address, &'a DataArray)>) {
    match value {
        Value::Array(array) => found.push((at.clone(), array)),
        Value::Map(map) => {
            for (key, child) in map {
                collect_arrays(child, &at.child(key), found);
            }
        }
        Value::Seq(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_arrays(child, &at.index(index), found);
            }
        }
        _ => {}
    }
}

/// Lower a Rust value into the value tree.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Rebuild a Rust value from the value tree.
pub trait FromValue: Sized {
    /// Decode `value`, found at `at`.
    fn from_value(value: Value, at: &Address) -> Result<Self>;

    /// Called when the field is absent from its node. Optional fields
    /// override this to decode as empty.
    fn from_missing(tag: &'static str, field: &str, at: &Address) -> Result<Self> {
        Err(ModelError::MissingField {
            tag,
            field: field.to_string(),
            at: at.clone(),
        })
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value, _at: &Address) -> Result<Self> {
        Ok(value)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        match value {
            Value::Bool(flag) => Ok(flag),
            other => Err(ModelError::mismatch("bool", &other, at)),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        match value {
            Value::Float(number) => Ok(number),
            Value::Int(number) => Ok(number as f64),
            Value::Str(ref sentinel) => {
                text::parse_float_sentinel(sentinel).ok_or_else(|| ModelError::mismatch("float", &value, at))
            }
            other => Err(ModelError::mismatch("float", &other, at)),
        }
    }
}

macro_rules! integer_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value, at: &Address) -> Result<Self> {
                    match value {
                        Value::Int(number) => <$ty>::try_from(number).map_err(|_| {
                            ModelError::TypeMismatch {
                                expected: stringify!($ty),
                                found: number.to_string(),
                                at: at.clone(),
                            }
                        }),
                        other => Err(ModelError::mismatch(stringify!($ty), &other, at)),
                    }
                }
            }
        )*
    };
}

integer_value!(i8, i32, i64, u8, u32);

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        match value {
            Value::Str(text) => Ok(text),
            other => Err(ModelError::mismatch("string", &other, at)),
        }
    }
}

impl ToValue for Complex64 {
    fn to_value(&self) -> Value {
        Value::Complex(*self)
    }
}

impl FromValue for Complex64 {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        match value {
            Value::Complex(number) => Ok(number),
            Value::Map(mut parts) if parts.len() == 2 => {
                let (Some(re), Some(im)) = (parts.shift_remove("real"), parts.shift_remove("imag"))
                else {
                    return Err(ModelError::TypeMismatch {
                        expected: "complex",
                        found: "mapping".to_string(),
                        at: at.clone(),
                    });
                };
                Ok(Complex64::new(
                    f64::from_value(re, &at.child("real"))?,
                    f64::from_value(im, &at.child("imag"))?,
                ))
            }
            real @ (Value::Float(_) | Value::Int(_)) => {
                Ok(Complex64::new(f64::from_value(real, at)?, 0.0))
            }
            other => Err(ModelError::mismatch("complex", &other, at)),
        }
    }
}

impl ToValue for DataArray {
    fn to_value(&self) -> Value {
        Value::Array(self.clone())
    }
}

impl FromValue for DataArray {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        match value {
            Value::Array(array) => Ok(array),
            Value::Str(marker) if crate::array::is_marker(&marker) => {
                Err(ModelError::DetachedArray {
                    marker,
                    at: at.clone(),
                })
            }
            other => Err(ModelError::mismatch("array", &other, at)),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, at).map(Some),
        }
    }

    fn from_missing(_tag: &'static str, _field: &str, _at: &Address) -> Result<Self> {
        Ok(None)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        match value {
            Value::Seq(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| T::from_value(item, &at.index(index)))
                .collect(),
            other => Err(ModelError::mismatch("sequence", &other, at)),
        }
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        let items = Vec::<T>::from_value(value, at)?;
        let len = items.len();
        items.try_into().map_err(|_| ModelError::TypeMismatch {
            expected: "fixed-length sequence",
            found: format!("sequence of {len} (expected {N})"),
            at: at.clone(),
        })
    }
}

impl<A: ToValue, B: ToValue> ToValue for (A, B) {
    fn to_value(&self) -> Value {
        Value::Seq(vec![self.0.to_value(), self.1.to_value()])
    }
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        let [a, b] = <[Value; 2]>::from_value(value, at)?;
        Ok((A::from_value(a, &at.index(0))?, B::from_value(b, &at.index(1))?))
    }
}

impl<A: ToValue, B: ToValue, C: ToValue> ToValue for (A, B, C) {
    fn to_value(&self) -> Value {
        Value::Seq(vec![self.0.to_value(), self.1.to_value(), self.2.to_value()])
    }
}

impl<A: FromValue, B: FromValue, C: FromValue> FromValue for (A, B, C) {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        let [a, b, c] = <[Value; 3]>::from_value(value, at)?;
        Ok((
            A::from_value(a, &at.index(0))?,
            B::from_value(b, &at.index(1))?,
            C::from_value(c, &at.index(2))?,
        ))
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value, at: &Address) -> Result<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, item)| {
                    let item = T::from_value(item, &at.child(&key))?;
                    Ok((key, item))
                })
                .collect(),
            other => Err(ModelError::mismatch("mapping", &other, at)),
        }
    }
}
