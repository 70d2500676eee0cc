//! Typed object model for electromagnetic simulations and their field data.
//!
//! # Overview
//!
//! - [`Model`] nodes are immutable, validated, type-tagged records declared
//!   with [`model_node!`]; closed unions of nodes use [`model_union!`].
//! - Every node lowers to a [`Value`] tree; [`text`] renders the canonical
//!   JSON (and YAML) form of that tree.
//! - Bulk numeric data lives in [`DataArray`]s, which text documents replace
//!   by markers. The [`ArrayRegistry`] rebuilds typed arrays from stored parts.
//! - Canonical text and its SHA-256 are computed once per node and define
//!   node equality and hashing.
//!
//! # Example
//!
//! ```ignore
//! use simstore_model::components::geometry::Sphere;
//! use simstore_model::{Model, text};
//!
//! let sphere = Sphere::new([0.0, 0.0, 0.0], 1.5)?;
//! let json = sphere.canonical_json();
//! let back: Sphere = text::from_json_str(&json)?;
//! assert_eq!(back, sphere);
//! ```

pub mod address;
pub mod array;
pub mod components;
pub mod error;
pub mod memo;
pub mod model;
pub mod text;
pub mod value;

pub use address::Address;
pub use array::{
    ArrayRegistry, Coords, DataArray, ElementType, FluxDataArray, FluxTimeDataArray, MarkerRef,
    ModeAmpsDataArray, ModeIndexDataArray, RawArray, ScalarFieldDataArray,
    ScalarFieldTimeDataArray, ScalarModeFieldDataArray, Values, array_registry, install_registry,
    is_marker, parse_marker,
};
pub use components::Component;
pub use error::{ModelError, Result};
pub use memo::{Identity, Memo};
pub use model::{FieldReader, Model, Validate};
pub use value::{FromValue, Map, TYPE_KEY, ToValue, Value};

pub use num_complex::Complex64;
