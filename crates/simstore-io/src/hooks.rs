//! Extension points called while a document is written or read.
//!
//! Encode hooks see every field of the value tree (with its address) while a
//! container is written and may add attachment entries. Decode hooks see every
//! field of a mapping after its children are materialized and may rewrite the
//! raw mapping before typed decoding. Closures with the matching signature
//! implement both traits.

use simstore_model::{Address, Map, Value};

use crate::container::ContainerWriter;
use crate::error::Result;

/// Called for every field while a container is written.
pub trait EncodeHook: Send + Sync {
    fn encode(&self, address: &Address, value: &Value, writer: &mut ContainerWriter) -> Result<()>;
}

impl<F> EncodeHook for F
where
    F: Fn(&Address, &Value, &mut ContainerWriter) -> Result<()> + Send + Sync,
{
    fn encode(&self, address: &Address, value: &Value, writer: &mut ContainerWriter) -> Result<()> {
        self(address, value, writer)
    }
}

/// Called for every field of a mapping while a document is read.
///
/// `address` is the field's own address; `raw` is the mapping that holds it.
pub trait DecodeHook: Send + Sync {
    fn decode(&self, address: &Address, raw: &mut Map, key: &str, value: &Value) -> Result<()>;
}

impl<F> DecodeHook for F
where
    F: Fn(&Address, &mut Map, &str, &Value) -> Result<()> + Send + Sync,
{
    fn decode(&self, address: &Address, raw: &mut Map, key: &str, value: &Value) -> Result<()> {
        self(address, raw, key, value)
    }
}
