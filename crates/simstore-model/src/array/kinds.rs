//! Typed array kinds with fixed dimension names.

use std::ops::Deref;

use super::{ArrayRegistry, Coords, DataArray, RawArray, Values};
use crate::address::Address;
use crate::error::{ModelError, Result};
use crate::value::{FromValue, ToValue, Value};

fn check_dims(kind: &str, expected: &[&str], found: &[String]) -> Result<()> {
    if found.iter().map(String::as_str).eq(expected.iter().copied()) {
        Ok(())
    } else {
        Err(ModelError::ArrayDims {
            kind: kind.to_string(),
            expected: expected.iter().map(|dim| (*dim).to_string()).collect(),
            found: found.to_vec(),
        })
    }
}

macro_rules! array_kind {
    ($(#[$meta:meta])* $name:ident [$($dim:literal),+]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(DataArray);

        impl $name {
            pub const KIND: &'static str = stringify!($name);
            pub const DIMS: &'static [&'static str] = &[$($dim),+];

            /// Build from coordinates given in `DIMS` order.
            pub fn new(coords: Vec<Coords>, values: Values) -> Result<Self> {
                let dims = Self::DIMS.iter().map(|dim| (*dim).to_string()).collect();
                DataArray::new(Self::KIND, dims, coords, values).map(Self)
            }

            /// Rebuild from stored parts, checking kind and dimension names.
            pub fn reconstruct(raw: RawArray) -> Result<DataArray> {
                if raw.kind != Self::KIND {
                    return Err(ModelError::UnknownArrayKind { kind: raw.kind });
                }
                check_dims(Self::KIND, Self::DIMS, &raw.dims)?;
                DataArray::from_raw(raw)
            }

            /// Register this kind's reconstruct function.
            pub fn register(registry: &mut ArrayRegistry) -> Result<()> {
                registry.register(Self::KIND, Self::reconstruct)
            }

            pub fn array(&self) -> &DataArray {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = DataArray;

            fn deref(&self) -> &DataArray {
                &self.0
            }
        }

        impl ToValue for $name {
            fn to_value(&self) -> Value {
                Value::Array(self.0.clone())
            }
        }

        impl FromValue for $name {
            fn from_value(value: Value, at: &Address) -> Result<Self> {
                let array = DataArray::from_value(value, at)?;
                if array.kind() != Self::KIND {
                    return Err(ModelError::ArrayKindMismatch {
                        expected: Self::KIND,
                        found: array.kind().to_string(),
                        at: at.clone(),
                    });
                }
                check_dims(Self::KIND, Self::DIMS, array.dims())?;
                Ok(Self(array))
            }
        }
    };
}

array_kind! {
    /// Frequency-domain field component on a spatial grid.
    ScalarFieldDataArray ["x", "y", "z", "f"]
}

array_kind! {
    /// Time-domain field component on a spatial grid.
    ScalarFieldTimeDataArray ["x", "y", "z", "t"]
}

array_kind! {
    /// Mode profile component per frequency and mode.
    ScalarModeFieldDataArray ["x", "y", "z", "f", "mode_index"]
}

array_kind! {
    /// Flux through a surface per frequency.
    FluxDataArray ["f"]
}

array_kind! {
    /// Flux through a surface over time.
    FluxTimeDataArray ["t"]
}

array_kind! {
    /// Complex mode amplitudes.
    ModeAmpsDataArray ["direction", "f", "mode_index"]
}

array_kind! {
    /// Complex effective index per frequency and mode.
    ModeIndexDataArray ["f", "mode_index"]
}

/// Reconstruct functions of every built-in kind.
pub(super) const BUILTIN_KINDS: &[(&str, super::Reconstruct)] = &[
    (ScalarFieldDataArray::KIND, ScalarFieldDataArray::reconstruct),
    (ScalarFieldTimeDataArray::KIND, ScalarFieldTimeDataArray::reconstruct),
    (ScalarModeFieldDataArray::KIND, ScalarModeFieldDataArray::reconstruct),
    (FluxDataArray::KIND, FluxDataArray::reconstruct),
    (FluxTimeDataArray::KIND, FluxTimeDataArray::reconstruct),
    (ModeAmpsDataArray::KIND, ModeAmpsDataArray::reconstruct),
    (ModeIndexDataArray::KIND, ModeIndexDataArray::reconstruct),
];
