//! Labeled multi-dimensional arrays.
//!
//! A [`DataArray`] carries a semantic kind id, one named axis per dimension
//! with its coordinates, and a flat row-major buffer of real or complex
//! cells. Arrays are immutable and reference counted, so copies of a node
//! share their payloads.

mod kinds;
pub mod payload;
mod registry;

use std::sync::Arc;

use num_complex::Complex64;
use sha2::{Digest, Sha256};

use crate::error::{ModelError, Result};
use crate::memo::Memo;

pub use kinds::{
    FluxDataArray, FluxTimeDataArray, ModeAmpsDataArray, ModeIndexDataArray,
    ScalarFieldDataArray, ScalarFieldTimeDataArray, ScalarModeFieldDataArray,
};
pub use registry::{
    ArrayRegistry, MARKER_PREFIX, MarkerRef, Reconstruct, array_registry, install_registry,
    is_marker, marker, parse_marker,
};

/// Coordinates along one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Coords {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
}

impl Coords {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(values) => values.len(),
            Self::Int(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Element type of the cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Real,
    Complex,
}

/// Cell buffer in row-major order.
#[derive(Debug, Clone)]
pub enum Values {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Self::Real(values) => values.len(),
            Self::Complex(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Real(_) => ElementType::Real,
            Self::Complex(_) => ElementType::Complex,
        }
    }
}

// Bitwise comparison so NaN cells compare equal to themselves.
impl PartialEq for Values {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Self::Complex(a), Self::Complex(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        x.re.to_bits() == y.re.to_bits() && x.im.to_bits() == y.im.to_bits()
                    })
            }
            _ => false,
        }
    }
}

/// Array parts as stored, before the registry rebuilds the typed kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArray {
    pub kind: String,
    pub dims: Vec<String>,
    pub coords: Vec<Coords>,
    pub values: Values,
}

#[derive(Debug)]
struct ArrayInner {
    kind: String,
    dims: Vec<String>,
    coords: Vec<Coords>,
    values: Values,
    digest: Memo<String>,
}

/// Immutable labeled array with a semantic kind.
#[derive(Debug, Clone)]
pub struct DataArray {
    inner: Arc<ArrayInner>,
}

impl DataArray {
    /// Build an array, checking that dims and coords pair up and that the
    /// cell count equals the product of the coordinate lengths.
    pub fn new(
        kind: impl Into<String>,
        dims: Vec<String>,
        coords: Vec<Coords>,
        values: Values,
    ) -> Result<Self> {
        let kind = kind.into();
        if dims.len() != coords.len() {
            return Err(ModelError::ArrayDims {
                kind,
                expected: dims,
                found: vec![format!("{} coordinate axes", coords.len())],
            });
        }
        let Some(expected) = coords
            .iter()
            .try_fold(1usize, |cells, axis| cells.checked_mul(axis.len()))
        else {
            return Err(ModelError::ArrayTooLarge {
                kind,
                shape: coords.iter().map(Coords::len).collect(),
            });
        };
        if values.len() != expected {
            return Err(ModelError::ArrayShape {
                kind,
                cells: values.len(),
                expected,
            });
        }
        Ok(Self {
            inner: Arc::new(ArrayInner {
                kind,
                dims,
                coords,
                values,
                digest: Memo::new(),
            }),
        })
    }

    pub fn from_raw(raw: RawArray) -> Result<Self> {
        Self::new(raw.kind, raw.dims, raw.coords, raw.values)
    }

    pub fn kind(&self) -> &str {
        &self.inner.kind
    }

    pub fn dims(&self) -> &[String] {
        &self.inner.dims
    }

    pub fn coords(&self) -> &[Coords] {
        &self.inner.coords
    }

    /// Coordinates of the named axis.
    pub fn coord(&self, dim: &str) -> Option<&Coords> {
        let position = self.inner.dims.iter().position(|name| name == dim)?;
        self.inner.coords.get(position)
    }

    pub fn values(&self) -> &Values {
        &self.inner.values
    }

    pub fn shape(&self) -> Vec<usize> {
        self.inner.coords.iter().map(Coords::len).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.values.is_empty()
    }

    pub fn element_type(&self) -> ElementType {
        self.inner.values.element_type()
    }

    /// First 16 hex chars of the SHA-256 of the binary payload; computed once.
    pub fn digest(&self) -> &str {
        self.inner.digest.get_or_init(|| {
            let hash = Sha256::digest(payload::encode(self));
            hex::encode(&hash[..8])
        })
    }

    /// Marker that stands in for this array in text documents.
    pub fn marker(&self) -> String {
        marker(self.kind(), self.digest())
    }

    /// True if both handles share one payload.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for DataArray {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.inner.kind == other.inner.kind
                && self.inner.dims == other.inner.dims
                && self.inner.coords == other.inner.coords
                && self.inner.values == other.inner.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_shape_is_an_error() {
        let axis = || Coords::Int((0..10_000).collect());
        let err = DataArray::new(
            "HugeDataArray",
            (0..5).map(|i| format!("d{i}")).collect(),
            (0..5).map(|_| axis()).collect(),
            Values::Real(vec![0.0]),
        )
        .unwrap_err();
        match err {
            ModelError::ArrayTooLarge { kind, shape } => {
                assert_eq!(kind, "HugeDataArray");
                assert_eq!(shape, vec![10_000; 5]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn flux(values: Vec<f64>) -> Result<DataArray> {
        DataArray::new(
            "FluxDataArray",
            vec!["f".to_string()],
            vec![Coords::Float(vec![1e14, 2e14])],
            Values::Real(values),
        )
    }

    #[test]
    fn shape_must_match_cells() {
        let err = flux(vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ArrayShape {
                cells: 1,
                expected: 2,
                ..
            }
        ));
    }

    #[test]
    fn zero_length_axes_are_allowed() {
        let array = DataArray::new(
            "FluxDataArray",
            vec!["f".to_string()],
            vec![Coords::Float(Vec::new())],
            Values::Real(Vec::new()),
        )
        .unwrap();
        assert!(array.is_empty());
        assert_eq!(array.shape(), vec![0]);
    }

    #[test]
    fn digest_tracks_content() {
        let a = flux(vec![1.0, 2.0]).unwrap();
        let b = flux(vec![1.0, 2.0]).unwrap();
        let c = flux(vec![1.0, 3.0]).unwrap();
        assert_eq!(a.digest().len(), 16);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn nan_cells_compare_equal() {
        let a = flux(vec![f64::NAN, 1.0]).unwrap();
        let b = flux(vec![f64::NAN, 1.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn clones_share_payload() {
        let a = flux(vec![1.0, 2.0]).unwrap();
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.coord("f"), Some(&Coords::Float(vec![1e14, 2e14])));
        assert_eq!(a.coord("t"), None);
    }
}
