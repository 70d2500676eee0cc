//! Model nodes: immutable, validated, type-tagged records.
//!
//! Concrete node types are declared with [`model_node!`](crate::model_node),
//! which generates the struct, its accessors, a validating constructor and
//! the [`Model`], [`ToValue`] and [`FromValue`] implementations. Closed unions
//! of node types are declared with [`model_union!`](crate::model_union) and
//! dispatch on the `"type"` tag.

use std::sync::Arc;

use crate::address::Address;
use crate::error::{ModelError, Result};
use crate::memo::Identity;
use crate::text;
use crate::value::{FromValue, Map, TYPE_KEY, Value};

/// Construction-time checks of a node.
///
/// Returns a human readable reason on failure; the caller attaches the type
/// tag and address.
pub trait Validate {
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// A type-tagged, immutable model node.
pub trait Model: Validate + Clone + Sized {
    /// Unique tag written under `"type"`.
    const TYPE_TAG: &'static str;

    /// The node as a mapping: `"type"` first, then fields in declaration order.
    fn to_map(&self) -> Map;

    /// Build the node from its fields, then validate it.
    fn from_fields(fields: FieldReader) -> Result<Self>;

    /// Cached canonical text and hash of this instance.
    fn identity(&self) -> &Identity;

    /// Canonical text, computed once per instance.
    fn canonical_json(&self) -> Arc<str> {
        self.identity()
            .canonical_text(|| text::to_canonical_json(&Value::Map(self.to_map())))
    }

    /// Hex SHA-256 of the canonical text, computed once per instance.
    fn content_hash(&self) -> &str {
        self.identity().content_hash(|| self.canonical_json())
    }

    /// A new validated node with the given fields replaced.
    ///
    /// Fields not named keep their values (arrays are shared, not copied).
    /// Naming a field the node does not declare is an error.
    fn updated<K, I>(&self, updates: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut map = self.to_map();
        for (field, value) in updates {
            let field = field.into();
            match map.get_mut(&field) {
                Some(slot) if field != TYPE_KEY => *slot = value,
                _ => {
                    return Err(ModelError::ExtraField {
                        tag: Self::TYPE_TAG,
                        field,
                        at: Address::root(),
                    });
                }
            }
        }
        Self::from_fields(FieldReader::new(Self::TYPE_TAG, Address::root(), map))
    }
}

/// Pulls declared fields out of a node's mapping, in declaration order.
#[derive(Debug)]
pub struct FieldReader {
    tag: &'static str,
    at: Address,
    fields: Map,
}

impl FieldReader {
    /// Wrap a node mapping found at `at`. The `"type"` entry is dropped.
    pub fn new(tag: &'static str, at: Address, mut fields: Map) -> Self {
        fields.shift_remove(TYPE_KEY);
        Self { tag, at, fields }
    }

    /// Decode the named field.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
        match self.fields.shift_remove(name) {
            Some(value) => T::from_value(value, &self.at.child(name)),
            None => T::from_missing(self.tag, name, &self.at),
        }
    }

    /// Decode the named field, or use `default` when it is absent.
    pub fn take_or<T: FromValue>(&mut self, name: &str, default: impl FnOnce() -> T) -> Result<T> {
        match self.fields.shift_remove(name) {
            Some(value) => T::from_value(value, &self.at.child(name)),
            None => Ok(default()),
        }
    }

    pub fn at(&self) -> &Address {
        &self.at
    }

    /// Fail if any undeclared field is left; returns the node address.
    pub fn finish(self) -> Result<Address> {
        match self.fields.into_iter().next() {
            Some((field, _)) => Err(ModelError::ExtraField {
                tag: self.tag,
                field,
                at: self.at,
            }),
            None => Ok(self.at),
        }
    }
}

/// Run a node's validation, attributing failures to `at`.
pub fn check<T: Model>(node: &T, at: &Address) -> Result<()> {
    node.validate().map_err(|message| ModelError::Validation {
        tag: T::TYPE_TAG,
        message,
        at: at.clone(),
    })
}

/// The type tag of a node mapping.
pub fn peek_tag<'a>(value: &'a Value, at: &Address) -> Result<&'a str> {
    match value {
        Value::Map(map) => match map.get(TYPE_KEY) {
            Some(Value::Str(tag)) => Ok(tag),
            Some(other) => Err(ModelError::mismatch("string type tag", other, &at.child(TYPE_KEY))),
            None => Err(ModelError::MissingTag { at: at.clone() }),
        },
        other => Err(ModelError::mismatch("mapping", other, at)),
    }
}

/// Decode one concrete node, checking its tag first.
pub fn decode_node<T: Model>(value: Value, at: &Address) -> Result<T> {
    let tag = peek_tag(&value, at)?;
    if tag != T::TYPE_TAG {
        return Err(ModelError::UnknownTag {
            found: tag.to_string(),
            expected: T::TYPE_TAG.to_string(),
            at: at.clone(),
        });
    }
    match value {
        Value::Map(map) => T::from_fields(FieldReader::new(T::TYPE_TAG, at.clone(), map)),
        other => Err(ModelError::mismatch("mapping", &other, at)),
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! wire_name {
    ($field:ident, $wire:literal) => {
        $wire
    };
    ($field:ident) => {
        stringify!($field)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! take_field {
    ($fields:ident, $key:expr) => {
        $fields.take($key)
    };
    ($fields:ident, $key:expr, $default:expr) => {
        $fields.take_or($key, || $default)
    };
}

/// Declare a model node.
///
/// ```ignore
/// model_node! {
///     /// A sphere.
///     pub struct Sphere: "Sphere" {
///         center: [f64; 3],
///         radius: f64,
///     }
/// }
/// impl Validate for Sphere {}
/// ```
///
/// A field can use a different key on the wire with `name as "Key": Type`,
/// and a value used when a document omits it with `name: Type = expr`.
/// Defaults apply to decoding only; `new` still takes every field.
#[macro_export]
macro_rules! model_node {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $tag:literal {
            $(
                $(#[$fmeta:meta])*
                $field:ident $(as $wire:literal)? : $ty:ty $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $( $field: $ty, )*
            identity: $crate::Identity,
        }

        impl $name {
            /// Build a validated instance.
            #[allow(clippy::too_many_arguments)]
            pub fn new($( $field: $ty ),*) -> $crate::Result<Self> {
                let node = Self {
                    $( $field, )*
                    identity: $crate::Identity::default(),
                };
                $crate::model::check(&node, &$crate::Address::root())?;
                Ok(node)
            }

            $(
                $(#[$fmeta])*
                pub fn $field(&self) -> &$ty {
                    &self.$field
                }
            )*
        }

        impl $crate::Model for $name {
            const TYPE_TAG: &'static str = $tag;

            fn to_map(&self) -> $crate::Map {
                let mut map = $crate::Map::new();
                map.insert(
                    $crate::TYPE_KEY.to_string(),
                    $crate::Value::Str($tag.to_string()),
                );
                $(
                    map.insert(
                        $crate::wire_name!($field $(, $wire)?).to_string(),
                        $crate::ToValue::to_value(&self.$field),
                    );
                )*
                map
            }

            fn from_fields(mut fields: $crate::FieldReader) -> $crate::Result<Self> {
                let node = Self {
                    $(
                        $field: $crate::take_field!(
                            fields,
                            $crate::wire_name!($field $(, $wire)?)
                            $(, $default)?
                        )?,
                    )*
                    identity: $crate::Identity::default(),
                };
                let at = fields.finish()?;
                $crate::model::check(&node, &at)?;
                Ok(node)
            }

            fn identity(&self) -> &$crate::Identity {
                &self.identity
            }
        }

        impl $crate::ToValue for $name {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::Map($crate::Model::to_map(self))
            }
        }

        impl $crate::FromValue for $name {
            fn from_value(value: $crate::Value, at: &$crate::Address) -> $crate::Result<Self> {
                $crate::model::decode_node(value, at)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                $crate::Model::canonical_json(self) == $crate::Model::canonical_json(other)
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&$crate::Model::canonical_json(self), state);
            }
        }
    };
}

/// Declare a closed union of node types, dispatched on the `"type"` tag.
#[macro_export]
macro_rules! model_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident ( $inner:ty ) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $variant($inner), )+
        }

        impl $name {
            /// Type tags accepted by this union.
            pub const TAGS: &'static [&'static str] =
                &[ $( <$inner as $crate::Model>::TYPE_TAG ),+ ];

            /// Type tag of the held node.
            pub fn type_tag(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => <$inner as $crate::Model>::TYPE_TAG, )+
                }
            }

            /// Canonical text of the held node.
            pub fn canonical_json(&self) -> std::sync::Arc<str> {
                match self {
                    $( Self::$variant(node) => $crate::Model::canonical_json(node), )+
                }
            }

            /// Content hash of the held node.
            pub fn content_hash(&self) -> &str {
                match self {
                    $( Self::$variant(node) => $crate::Model::content_hash(node), )+
                }
            }
        }

        impl $crate::ToValue for $name {
            fn to_value(&self) -> $crate::Value {
                match self {
                    $( Self::$variant(node) => $crate::ToValue::to_value(node), )+
                }
            }
        }

        impl $crate::FromValue for $name {
            fn from_value(value: $crate::Value, at: &$crate::Address) -> $crate::Result<Self> {
                let tag = $crate::model::peek_tag(&value, at)?.to_string();
                $(
                    if tag == <$inner as $crate::Model>::TYPE_TAG {
                        return <$inner as $crate::FromValue>::from_value(value, at)
                            .map(Self::$variant);
                    }
                )+
                Err($crate::ModelError::UnknownTag {
                    found: tag,
                    expected: Self::TAGS.join(", "),
                    at: at.clone(),
                })
            }
        }

        $(
            impl From<$inner> for $name {
                fn from(node: $inner) -> Self {
                    Self::$variant(node)
                }
            }
        )+
    };
}
