//! Per-request component registry.
//!
//! Tracks the last-known server-side data for every component emitted in one
//! response, so emitters can compute the next cumulative frame. Lives on the
//! request task's stack and dies with it — no cross-request state.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::component::envelope::ComponentKind;
use crate::errors::RegistryError;

#[derive(Debug)]
struct RegistryEntry {
    kind: ComponentKind,
    data: Map<String, Value>,
}

/// Request-scoped mapping from component id to its current data snapshot.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry. Fails if the id is already present; id generation
    /// is expected to make that impossible.
    pub fn introduce(
        &mut self,
        id: &str,
        kind: ComponentKind,
        initial_data: Map<String, Value>,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(id) {
            return Err(RegistryError::DuplicateId { id: id.to_string() });
        }
        self.entries.insert(
            id.to_string(),
            RegistryEntry {
                kind,
                data: initial_data,
            },
        );
        Ok(())
    }

    /// Merge `patch` into an existing entry with shallow key-replacement
    /// semantics, returning the entry's kind. Cumulative array fields are
    /// passed by callers as the already-accumulated full array, so shallow
    /// replace is correct.
    pub fn update(
        &mut self,
        id: &str,
        patch: &Map<String, Value>,
    ) -> Result<ComponentKind, RegistryError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownId { id: id.to_string() })?;
        for (key, value) in patch {
            entry.data.insert(key.clone(), value.clone());
        }
        Ok(entry.kind)
    }

    /// Current data snapshot for `id`, if introduced.
    pub fn get(&self, id: &str) -> Option<&Map<String, Value>> {
        self.entries.get(id).map(|entry| &entry.data)
    }

    /// Kind recorded at introduction.
    pub fn kind_of(&self, id: &str) -> Option<ComponentKind> {
        self.entries.get(id).map(|entry| entry.kind)
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_introduce_and_get() {
        let mut registry = ComponentRegistry::new();
        registry
            .introduce("a", ComponentKind::SimpleComponent, Map::new())
            .unwrap();
        assert!(registry.has("a"));
        assert_eq!(registry.get("a").unwrap().len(), 0);
        assert_eq!(registry.kind_of("a"), Some(ComponentKind::SimpleComponent));
    }

    #[test]
    fn test_introduce_duplicate_fails() {
        let mut registry = ComponentRegistry::new();
        registry
            .introduce("a", ComponentKind::SimpleComponent, Map::new())
            .unwrap();
        let err = registry
            .introduce("a", ComponentKind::TableA, Map::new())
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId { .. }));
        // First entry untouched
        assert_eq!(registry.kind_of("a"), Some(ComponentKind::SimpleComponent));
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let mut registry = ComponentRegistry::new();
        let err = registry.update("ghost", &Map::new()).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownId { .. }));
    }

    #[test]
    fn test_update_merges_shallowly() {
        let mut registry = ComponentRegistry::new();
        registry
            .introduce(
                "card",
                ComponentKind::SimpleComponent,
                map(&[("title", json!("Card")), ("date", json!("2025-10-14"))]),
            )
            .unwrap();
        registry
            .update(
                "card",
                &map(&[("units", json!(50)), ("title", json!("Updated"))]),
            )
            .unwrap();

        let data = registry.get("card").unwrap();
        assert_eq!(data["title"], json!("Updated"));
        assert_eq!(data["date"], json!("2025-10-14"));
        assert_eq!(data["units"], json!(50));
    }

    #[test]
    fn test_update_replaces_arrays_wholesale() {
        let mut registry = ComponentRegistry::new();
        registry
            .introduce(
                "t",
                ComponentKind::TableA,
                map(&[("columns", json!(["A"])), ("rows", json!([]))]),
            )
            .unwrap();
        registry
            .update("t", &map(&[("rows", json!([["x", 1]]))]))
            .unwrap();
        registry
            .update("t", &map(&[("rows", json!([["x", 1], ["y", 2]]))]))
            .unwrap();

        let data = registry.get("t").unwrap();
        assert_eq!(data["rows"].as_array().unwrap().len(), 2);
        assert_eq!(data["columns"], json!(["A"]));
    }

    #[test]
    fn test_len_and_is_empty() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.is_empty());
        registry
            .introduce("a", ComponentKind::ChartComponent, Map::new())
            .unwrap();
        registry
            .introduce("b", ComponentKind::TableA, Map::new())
            .unwrap();
        assert_eq!(registry.len(), 2);
    }
}
