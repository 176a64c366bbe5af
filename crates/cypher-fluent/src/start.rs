//! `START` clause bits and the entity references they bind.

use crate::clause::ClauseWriter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a node by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeReference(u64);

impl NodeReference {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeReference {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<NodeReference> for Value {
    fn from(r: NodeReference) -> Self {
        Value::from(r.0)
    }
}

impl std::fmt::Display for NodeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node/{}", self.0)
    }
}

/// Reference to a relationship by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipReference(u64);

impl RelationshipReference {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl From<u64> for RelationshipReference {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<RelationshipReference> for Value {
    fn from(r: RelationshipReference) -> Self {
        Value::from(r.0)
    }
}

impl std::fmt::Display for RelationshipReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "relationship/{}", self.0)
    }
}

/// What a `START` identity is bound to.
#[derive(Clone, Debug, PartialEq)]
pub enum StartTarget {
    /// `node({p0}, {p1}, ...)`
    Nodes(Vec<NodeReference>),
    /// `relationship({p0}, ...)`
    Relationships(Vec<RelationshipReference>),
    /// `node(*)`
    AllNodes,
    /// `relationship(*)`
    AllRelationships,
    /// `node:index(key = {p0})`
    NodeIndex {
        index: String,
        key: String,
        value: Value,
    },
    /// `relationship:index(key = {p0})`
    RelationshipIndex {
        index: String,
        key: String,
        value: Value,
    },
}

impl From<NodeReference> for StartTarget {
    fn from(r: NodeReference) -> Self {
        StartTarget::Nodes(vec![r])
    }
}

impl From<Vec<NodeReference>> for StartTarget {
    fn from(refs: Vec<NodeReference>) -> Self {
        StartTarget::Nodes(refs)
    }
}

impl From<RelationshipReference> for StartTarget {
    fn from(r: RelationshipReference) -> Self {
        StartTarget::Relationships(vec![r])
    }
}

impl From<Vec<RelationshipReference>> for StartTarget {
    fn from(refs: Vec<RelationshipReference>) -> Self {
        StartTarget::Relationships(refs)
    }
}

/// One comma-separated element of a `START` clause, e.g. `n=node({p0})`.
#[derive(Clone, Debug, PartialEq)]
pub struct StartBit {
    identity: String,
    target: StartTarget,
}

impl StartBit {
    /// Bind `identity` to an arbitrary target.
    pub fn new(identity: impl Into<String>, target: impl Into<StartTarget>) -> Self {
        Self {
            identity: identity.into(),
            target: target.into(),
        }
    }

    /// `identity=node({p})`
    pub fn node(identity: impl Into<String>, reference: NodeReference) -> Self {
        Self::new(identity, reference)
    }

    /// `identity=node({p0}, {p1}, ...)`
    pub fn nodes(
        identity: impl Into<String>,
        references: impl IntoIterator<Item = NodeReference>,
    ) -> Self {
        Self::new(
            identity,
            StartTarget::Nodes(references.into_iter().collect()),
        )
    }

    /// `identity=relationship({p})`
    pub fn relationship(identity: impl Into<String>, reference: RelationshipReference) -> Self {
        Self::new(identity, reference)
    }

    /// `identity=node(*)`
    pub fn all_nodes(identity: impl Into<String>) -> Self {
        Self::new(identity, StartTarget::AllNodes)
    }

    /// `identity=relationship(*)`
    pub fn all_relationships(identity: impl Into<String>) -> Self {
        Self::new(identity, StartTarget::AllRelationships)
    }

    /// `identity=node:index(key = {p})`
    pub fn node_index(
        identity: impl Into<String>,
        index: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::new(
            identity,
            StartTarget::NodeIndex {
                index: index.into(),
                key: key.into(),
                value: value.into(),
            },
        )
    }

    /// `identity=relationship:index(key = {p})`
    pub fn relationship_index(
        identity: impl Into<String>,
        index: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::new(
            identity,
            StartTarget::RelationshipIndex {
                index: index.into(),
                key: key.into(),
                value: value.into(),
            },
        )
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn target(&self) -> &StartTarget {
        &self.target
    }

    pub(crate) fn write(&self, w: &mut ClauseWriter<'_>) {
        w.push(&self.identity).push("=");
        match &self.target {
            StartTarget::Nodes(refs) => {
                w.push("node(").push_bind_list(refs.iter().copied()).push(")");
            }
            StartTarget::Relationships(refs) => {
                w.push("relationship(")
                    .push_bind_list(refs.iter().copied())
                    .push(")");
            }
            StartTarget::AllNodes => {
                w.push("node(*)");
            }
            StartTarget::AllRelationships => {
                w.push("relationship(*)");
            }
            StartTarget::NodeIndex { index, key, value } => {
                w.push("node:")
                    .push(index)
                    .push("(")
                    .push(key)
                    .push(" = ")
                    .push_bind(value.clone())
                    .push(")");
            }
            StartTarget::RelationshipIndex { index, key, value } => {
                w.push("relationship:")
                    .push(index)
                    .push("(")
                    .push(key)
                    .push(" = ")
                    .push_bind(value.clone())
                    .push(")");
            }
        }
    }
}

impl<I: Into<String>> From<(I, NodeReference)> for StartBit {
    fn from((identity, reference): (I, NodeReference)) -> Self {
        StartBit::node(identity, reference)
    }
}

impl<I: Into<String>> From<(I, RelationshipReference)> for StartBit {
    fn from((identity, reference): (I, RelationshipReference)) -> Self {
        StartBit::relationship(identity, reference)
    }
}
