//! Attribute predicates over the entities of one type.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::graph::NodeId;
use crate::sim_error::SimError;
use crate::topology::attribute::check_type;
use crate::topology::entity::EntityType;
use crate::topology::model::Model;
use crate::topology::registry::value_key;
use crate::value::{DataType, Value};

/// Comparison operator of a [`Model::query`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl Comparator {
    /// `<`, `<=`, `>` and `>=`.
    #[inline]
    pub fn is_ordering(self) -> bool {
        !matches!(self, Comparator::Eq | Comparator::Ne)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        }
    }

    fn accepts(self, ord: Ordering) -> bool {
        match self {
            Comparator::Eq => ord == Ordering::Equal,
            Comparator::Ne => ord != Ordering::Equal,
            Comparator::Lt => ord == Ordering::Less,
            Comparator::Le => ord != Ordering::Greater,
            Comparator::Gt => ord == Ordering::Greater,
            Comparator::Ge => ord != Ordering::Less,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts ASCII and Unicode spellings (`>=` and `≥`, `!=` and `≠`, …).
impl FromStr for Comparator {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" | "==" => Ok(Comparator::Eq),
            "!=" | "≠" => Ok(Comparator::Ne),
            "<" => Ok(Comparator::Lt),
            "<=" | "≤" => Ok(Comparator::Le),
            ">" => Ok(Comparator::Gt),
            ">=" | "≥" => Ok(Comparator::Ge),
            other => Err(SimError::UnsupportedComparator(format!("`{other}`"))),
        }
    }
}

impl Model {
    /// Entities of `ty` whose attribute `name` satisfies `cmp operand`.
    ///
    /// - `= None` / `!= None` select the entities without / with a value.
    /// - `= v` is a lookup on `v`'s value node; `!= v` is its complement
    ///   (entities without a value included).
    /// - Ordering comparators need a numeric attribute and operand and scan
    ///   the entities of `ty`; entities without a value never match.
    ///
    /// Results follow the creation order of the entities.
    pub fn query(
        &self,
        ty: EntityType,
        name: &str,
        cmp: Comparator,
        operand: Option<&Value>,
    ) -> Result<Vec<NodeId>, SimError> {
        let (key, data_type) = self.attribute(ty, name)?;
        let entities = self.all_entities(ty)?;

        if cmp.is_ordering() {
            let Some(operand) = operand else {
                return Err(SimError::UnsupportedComparator(format!(
                    "`{cmp}` against a missing value"
                )));
            };
            if data_type != DataType::Number {
                return Err(SimError::UnsupportedComparator(format!(
                    "`{cmp}` on {data_type} attribute `{name}`"
                )));
            }
            check_type(name, data_type, operand)?;
            let Some(rhs) = operand.as_number() else {
                return Ok(Vec::new());
            };
            let mut hits = Vec::new();
            for entity in entities {
                let lhs = self.value_of(&entity, &key)?.and_then(|v| v.as_number());
                if lhs
                    .and_then(|lhs| lhs.partial_cmp(&rhs))
                    .is_some_and(|ord| cmp.accepts(ord))
                {
                    hits.push(entity);
                }
            }
            return Ok(hits);
        }

        let holders: HashSet<NodeId> = match operand {
            None => self.graph.nodes_with_out_edge(&key)?.into_iter().collect(),
            Some(v) => {
                check_type(name, data_type, v)?;
                let node = value_key(&key, &v.canonical_key()?);
                if self.graph.has_node(&node) {
                    self.graph.predecessors(&node, &key)?.into_iter().collect()
                } else {
                    HashSet::new()
                }
            }
        };
        // `= None` asks for the entities outside `holders`.
        let keep_holders = (cmp == Comparator::Eq) == operand.is_some();
        Ok(entities
            .into_iter()
            .filter(|e| holders.contains(e) == keep_holders)
            .collect())
    }
}
