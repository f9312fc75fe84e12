//! Attributes: typed, per-entity-type values stored as shared value nodes.
//!
//! An attribute `name` on entity type `T` is the node
//! [`attribute_key(T, name)`](attribute_key), registered under `T`'s
//! attribute registry. Each attribute owns a many-to-one edge type of the
//! same name linking an entity to its current value node. Value nodes are
//! shared: every entity holding an equal value points at the same node, so
//! the entities holding a value are the predecessors of its node.

use std::str::FromStr;

use crate::graph::{NodeId, Relationship};
use crate::sim_error::SimError;
use crate::topology::entity::EntityType;
use crate::topology::model::Model;
use crate::topology::registry::{ATTRIB_LINK, REGISTRY, attribute_key, value_key};
use crate::value::{DataType, Value};

/// Property of an attribute node holding its declared [`DataType`].
pub const DATA_TYPE_PROP: &str = "data_type";
/// Property of an attribute node holding the user-facing name.
pub const ATTRIBUTE_NAME_PROP: &str = "attribute_name";
/// Property of a value node holding the typed value.
pub const VALUE_PROP: &str = "value";

fn validate_name(name: &str) -> Result<(), SimError> {
    if name.is_empty() || name.contains(':') {
        return Err(SimError::InvalidValue(format!(
            "attribute name `{name}` must be non-empty and free of `:`"
        )));
    }
    Ok(())
}

impl Model {
    /// Declares attribute `name` on `ty`.
    ///
    /// Re-declaring with the same data type is a no-op (and lists the
    /// attribute in the active snapshot if it was declared in another one).
    /// Re-declaring with a different data type fails with
    /// [`SimError::TypeConflict`].
    pub fn declare_attribute(
        &mut self,
        ty: EntityType,
        name: &str,
        data_type: DataType,
    ) -> Result<(), SimError> {
        validate_name(name)?;
        let key = attribute_key(ty, name);
        if self.graph.has_node(&key) {
            let existing = self.stored_data_type(&key)?;
            if existing != data_type {
                return Err(SimError::TypeConflict {
                    attribute: name.to_string(),
                    existing: existing.to_string(),
                    requested: data_type.to_string(),
                });
            }
        } else {
            log::debug!("declaring {data_type} attribute `{name}` on {ty}");
            self.graph.add_node(&key)?;
            self.graph
                .set_node_property(&key, DATA_TYPE_PROP, data_type.as_str())?;
            self.graph.set_node_property(&key, ATTRIBUTE_NAME_PROP, name)?;
            self.graph
                .add_edge_type(&key, Relationship::ManyToOne, true)?;
        }
        self.graph
            .add_edge(self.registry.attributes(ty), &key, REGISTRY)
    }

    /// Whether `name` was ever declared on `ty`.
    pub fn has_attribute(&self, ty: EntityType, name: &str) -> bool {
        self.graph.has_node(&attribute_key(ty, name))
    }

    pub fn attribute_data_type(&self, ty: EntityType, name: &str) -> Result<DataType, SimError> {
        Ok(self.attribute(ty, name)?.1)
    }

    /// Names of the attributes declared on `ty` in the active snapshot, in
    /// declaration order.
    pub fn attributes(&self, ty: EntityType) -> Result<Vec<String>, SimError> {
        self.graph
            .successors(self.registry.attributes(ty), REGISTRY)?
            .iter()
            .map(|key| match self.graph.get_node_property(key, ATTRIBUTE_NAME_PROP)? {
                Value::Text(name) => Ok(name.clone()),
                other => Err(SimError::InvariantViolation(format!(
                    "attribute node `{key}` has name {other:?}"
                ))),
            })
            .collect()
    }

    /// Sets `entity`'s value for attribute `name`, replacing any previous one.
    pub fn set_attribute_value(
        &mut self,
        entity: &str,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), SimError> {
        let value = value.into();
        let ty = self.entity_type(entity)?;
        let (key, data_type) = self.attribute(ty, name)?;
        check_type(name, data_type, &value)?;
        let node = value_key(&key, &value.canonical_key()?);
        if !self.graph.has_node(&node) {
            self.graph.add_node(&node)?;
            self.graph.set_node_property(&node, VALUE_PROP, value)?;
        }
        self.graph.add_edge(&node, &key, ATTRIB_LINK)?;
        self.graph.add_edge(entity, &node, &key)
    }

    /// `entity`'s current value for `name`, `None` if it was never set.
    pub fn get_attribute_value(&self, entity: &str, name: &str) -> Result<Option<Value>, SimError> {
        let ty = self.entity_type(entity)?;
        let (key, _) = self.attribute(ty, name)?;
        self.value_of(entity, &key)
    }

    /// Every distinct value of `name` currently held by at least one entity
    /// of `ty`, in first-use order.
    pub fn get_all_values(&self, ty: EntityType, name: &str) -> Result<Vec<Value>, SimError> {
        let (key, _) = self.attribute(ty, name)?;
        let mut values = Vec::new();
        for node in self.graph.predecessors(&key, ATTRIB_LINK)? {
            if self.graph.degree_in(&node, &key)? > 0 {
                values.push(self.graph.get_node_property(&node, VALUE_PROP)?.clone());
            }
        }
        Ok(values)
    }

    // === Internals ===

    /// Attribute node key and declared type; `NotFound` if undeclared.
    pub(crate) fn attribute(
        &self,
        ty: EntityType,
        name: &str,
    ) -> Result<(NodeId, DataType), SimError> {
        let key = attribute_key(ty, name);
        if !self.graph.has_node(&key) {
            return Err(SimError::NotFound(format!("attribute `{name}` on {ty}")));
        }
        let data_type = self.stored_data_type(&key)?;
        Ok((key, data_type))
    }

    /// Value behind `entity`'s edge on attribute channel `key`.
    pub(crate) fn value_of(&self, entity: &str, key: &str) -> Result<Option<Value>, SimError> {
        match self.graph.successors(entity, key)?.first() {
            Some(node) => Ok(Some(self.graph.get_node_property(node, VALUE_PROP)?.clone())),
            None => Ok(None),
        }
    }

    fn stored_data_type(&self, key: &str) -> Result<DataType, SimError> {
        match self.graph.get_node_property(key, DATA_TYPE_PROP)? {
            Value::Text(s) => DataType::from_str(s),
            other => Err(SimError::InvariantViolation(format!(
                "attribute node `{key}` has data type {other:?}"
            ))),
        }
    }
}

/// `TypeMismatch` unless `value` carries `expected`'s tag.
pub(crate) fn check_type(name: &str, expected: DataType, value: &Value) -> Result<(), SimError> {
    let found = value.data_type();
    if found != expected {
        return Err(SimError::TypeMismatch {
            attribute: name.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_positions(n: usize) -> (Model, Vec<NodeId>) {
        let mut m = Model::new().unwrap();
        let ps = (0..n)
            .map(|i| m.add_position([i as f64, 0.0, 0.0]).unwrap())
            .collect();
        (m, ps)
    }

    #[test]
    fn coords_attribute_is_builtin() {
        let (m, ps) = model_with_positions(1);
        assert!(m.has_attribute(EntityType::Position, "xyz"));
        assert_eq!(
            m.attribute_data_type(EntityType::Position, "xyz").unwrap(),
            DataType::List
        );
        assert_eq!(
            m.get_attribute_value(&ps[0], "xyz").unwrap(),
            Some(Value::from([0.0, 0.0, 0.0]))
        );
    }

    #[test]
    fn declarations_are_idempotent_per_type() {
        let (mut m, _) = model_with_positions(0);
        m.declare_attribute(EntityType::Point, "w", DataType::Number).unwrap();
        m.declare_attribute(EntityType::Point, "w", DataType::Number).unwrap();
        assert_eq!(m.attributes(EntityType::Point).unwrap(), vec!["w".to_string()]);
        assert_eq!(
            m.declare_attribute(EntityType::Point, "w", DataType::Text),
            Err(SimError::TypeConflict {
                attribute: "w".into(),
                existing: "number".into(),
                requested: "string".into(),
            })
        );
        // same name on another type is a separate attribute
        m.declare_attribute(EntityType::Polyline, "w", DataType::Text).unwrap();
        assert_eq!(
            m.attributes(EntityType::Position).unwrap(),
            vec!["xyz".to_string()]
        );
    }

    #[test]
    fn bad_names_are_rejected() {
        let (mut m, _) = model_with_positions(0);
        for name in ["", "a:b", "::"] {
            assert!(matches!(
                m.declare_attribute(EntityType::Point, name, DataType::Number),
                Err(SimError::InvalidValue(_))
            ));
        }
    }

    #[test]
    fn set_and_replace_values() {
        let (mut m, ps) = model_with_positions(2);
        m.declare_attribute(EntityType::Position, "aa", DataType::Number).unwrap();
        assert_eq!(m.get_attribute_value(&ps[0], "aa").unwrap(), None);
        m.set_attribute_value(&ps[0], "aa", 5).unwrap();
        m.set_attribute_value(&ps[1], "aa", 5.0).unwrap();
        // both entities share one value node
        let node = value_key(&attribute_key(EntityType::Position, "aa"), "5");
        assert_eq!(
            m.graph().predecessors(&node, &attribute_key(EntityType::Position, "aa")).unwrap(),
            ps.clone()
        );
        m.set_attribute_value(&ps[0], "aa", 7).unwrap();
        assert_eq!(m.get_attribute_value(&ps[0], "aa").unwrap(), Some(Value::Number(7.0)));
        assert_eq!(
            m.get_all_values(EntityType::Position, "aa").unwrap(),
            vec![Value::Number(5.0), Value::Number(7.0)]
        );
        m.set_attribute_value(&ps[1], "aa", 7).unwrap();
        // 5 is no longer held by anyone
        assert_eq!(
            m.get_all_values(EntityType::Position, "aa").unwrap(),
            vec![Value::Number(7.0)]
        );
    }

    #[test]
    fn write_errors() {
        let (mut m, ps) = model_with_positions(1);
        assert!(matches!(
            m.set_attribute_value(&ps[0], "missing", 1),
            Err(SimError::NotFound(_))
        ));
        assert!(matches!(
            m.get_attribute_value(&ps[0], "missing"),
            Err(SimError::NotFound(_))
        ));
        assert_eq!(
            m.set_attribute_value(&ps[0], "xyz", "up"),
            Err(SimError::TypeMismatch {
                attribute: "xyz".into(),
                expected: "list".into(),
                found: "string".into(),
            })
        );
        assert!(matches!(
            m.set_attribute_value("ps9", "xyz", [1.0, 1.0, 1.0]),
            Err(SimError::NotFound(_))
        ));
    }

    #[test]
    fn map_values_dedupe_regardless_of_insertion_order() {
        use std::collections::BTreeMap;
        let (mut m, ps) = model_with_positions(2);
        m.declare_attribute(EntityType::Position, "meta", DataType::Map).unwrap();
        let mut a = BTreeMap::new();
        a.insert("k".to_string(), Value::from(1.0));
        a.insert("j".to_string(), Value::from(true));
        let mut b = BTreeMap::new();
        b.insert("j".to_string(), Value::from(true));
        b.insert("k".to_string(), Value::from(1.0));
        m.set_attribute_value(&ps[0], "meta", a).unwrap();
        m.set_attribute_value(&ps[1], "meta", b).unwrap();
        assert_eq!(m.get_all_values(EntityType::Position, "meta").unwrap().len(), 1);
    }
}
