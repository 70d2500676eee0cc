//! Turning a parsed document back into a value tree.
//!
//! A load first descends the parsed JSON to the requested address, then
//! materializes only that sub-tree: markers are replaced by the arrays read
//! from the container, and decode hooks run on every mapping field.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use simstore_model::text::scalar_from_json;
use simstore_model::{Address, Map, Value, is_marker};

use crate::container::ContainerReader;
use crate::error::{Result, StoreError};
use crate::hooks::DecodeHook;

/// Follow `address` down a parsed document.
pub(crate) fn descend<'a>(json: &'a JsonValue, address: &Address, path: &Path) -> Result<&'a JsonValue> {
    let mut current = json;
    let mut at = Address::root();
    for segment in address.segments() {
        let not_found = |reason: String| StoreError::AddressNotFound {
            address: address.clone(),
            path: path.to_path_buf(),
            reason,
        };
        current = match current {
            JsonValue::Object(entries) => entries
                .get(segment)
                .ok_or_else(|| not_found(format!("no field '{segment}' at {at}")))?,
            JsonValue::Array(items) => {
                let index = segment
                    .parse::<usize>()
                    .map_err(|_| not_found(format!("'{segment}' is not a sequence index at {at}")))?;
                items.get(index).ok_or_else(|| {
                    not_found(format!(
                        "index {index} is out of range at {at} (length {})",
                        items.len()
                    ))
                })?
            }
            _ => return Err(not_found(format!("{at} is a scalar"))),
        };
        at = at.child(segment);
    }
    Ok(current)
}

/// Converts parsed JSON into a [`Value`], resolving markers against an open
/// container.
pub(crate) struct Materializer<'a> {
    /// `None` for text documents: markers stay strings.
    pub source: Option<&'a ContainerReader>,
    pub verify_digests: bool,
    pub hooks: &'a [Arc<dyn DecodeHook>],
}

impl Materializer<'_> {
    pub fn materialize(&self, json: &JsonValue, at: &Address) -> Result<Value> {
        match json {
            JsonValue::String(text) if is_marker(text) => match self.source {
                Some(reader) => self.resolve_marker(reader, text, at).map(Value::Array),
                None => Ok(Value::Str(text.clone())),
            },
            JsonValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.materialize(item, &at.index(index)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Seq),
            JsonValue::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, item) in entries {
                    map.insert(key.clone(), self.materialize(item, &at.child(key))?);
                }
                self.run_hooks(at, &mut map)?;
                Ok(Value::Map(map))
            }
            scalar => Ok(scalar_from_json(scalar).unwrap_or(Value::Null)),
        }
    }

    fn resolve_marker(
        &self,
        reader: &ContainerReader,
        marker: &str,
        at: &Address,
    ) -> Result<simstore_model::DataArray> {
        let array = reader.read_array(at)?;
        if self.verify_digests {
            let found = array.marker();
            if found != marker {
                return Err(StoreError::DigestMismatch {
                    address: at.to_string(),
                    path: reader.path().to_path_buf(),
                    expected: marker.to_string(),
                    found,
                });
            }
        }
        Ok(array)
    }

    fn run_hooks(&self, at: &Address, map: &mut Map) -> Result<()> {
        if self.hooks.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = map.keys().cloned().collect();
        for key in keys {
            for hook in self.hooks {
                // An earlier hook may have removed the field.
                let Some(value) = map.get(&key).cloned() else {
                    break;
                };
                hook.decode(&at.child(&key), map, &key, &value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> JsonValue {
        json!({
            "type": "Simulation",
            "structures": [{"type": "Structure", "geometry": {"type": "Sphere", "radius": 1.0}}],
            "monitors": {"flux": {"type": "FluxMonitor", "name": "flux"}},
        })
    }

    #[test]
    fn test_descend_to_nested_nodes() {
        let doc = document();
        let path = Path::new("sim.json");
        let sphere = descend(&doc, &Address::parse("/structures/0/geometry"), path).unwrap();
        assert_eq!(sphere["type"], "Sphere");
        let root = descend(&doc, &Address::root(), path).unwrap();
        assert_eq!(root, &doc);
    }

    #[test]
    fn test_descend_failures_name_the_reason() {
        let doc = document();
        let path = Path::new("sim.json");
        let cases = [
            ("/monitors/field", "no field 'field' at /monitors"),
            ("/structures/first", "'first' is not a sequence index at /structures"),
            ("/structures/3", "index 3 is out of range at /structures (length 1)"),
            ("/type/x", "/type is a scalar"),
        ];
        for (address, reason) in cases {
            match descend(&doc, &Address::parse(address), path) {
                Err(StoreError::AddressNotFound { reason: found, .. }) => {
                    assert_eq!(found, reason, "{address}");
                }
                other => panic!("{address}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_text_markers_stay_strings() {
        let marker = "@array:FluxDataArray:0123456789abcdef";
        let doc = json!({"flux": marker, "n": 1, "x": 1.5});
        let materializer = Materializer {
            source: None,
            verify_digests: true,
            hooks: &[],
        };
        let value = materializer.materialize(&doc, &Address::root()).unwrap();
        let Value::Map(map) = value else {
            panic!("expected a mapping");
        };
        assert_eq!(map["flux"], Value::Str(marker.into()));
        assert_eq!(map["n"], Value::Int(1));
        assert_eq!(map["x"], Value::Float(1.5));
    }

    #[test]
    fn test_hooks_may_rewrite_the_raw_map() {
        let hook: Arc<dyn DecodeHook> = Arc::new(RenameLegacy);
        let hooks = [hook];
        let materializer = Materializer {
            source: None,
            verify_digests: true,
            hooks: &hooks,
        };
        let doc = json!({"type": "Medium", "eps": 2.0, "conductivity": 0.0});
        let Value::Map(map) = materializer.materialize(&doc, &Address::root()).unwrap() else {
            panic!("expected a mapping");
        };
        assert_eq!(map.get("permittivity"), Some(&Value::Float(2.0)));
        assert!(!map.contains_key("eps"));
    }

    struct RenameLegacy;

    impl DecodeHook for RenameLegacy {
        fn decode(&self, _address: &Address, raw: &mut Map, key: &str, value: &Value) -> Result<()> {
            if key == "eps" {
                raw.shift_remove(key);
                raw.insert("permittivity".into(), value.clone());
            }
            Ok(())
        }
    }
}
