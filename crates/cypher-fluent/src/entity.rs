//! Typed wrappers for entities returned by the REST endpoint.
//!
//! The endpoint represents a node as `{"self": ".../node/123", "data": {...}, ...}` and a
//! relationship as `{"self": ".../relationship/7", "start": ..., "end": ..., "type": ..., "data": {...}}`.

use crate::start::{NodeReference, RelationshipReference};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Extract the trailing numeric id from an entity link.
///
/// Accepts absolute URLs (`http://host/db/data/node/3`) and bare paths (`/db/data/node/3`).
pub fn id_from_link(link: &str) -> Option<u64> {
    let last = match url::Url::parse(link) {
        Ok(url) => url
            .path_segments()?
            .filter(|s| !s.is_empty())
            .next_back()?
            .to_string(),
        Err(_) => link.trim_end_matches('/').rsplit('/').next()?.to_string(),
    };
    last.parse().ok()
}

/// Whether a JSON object looks like a REST entity (has a `self` link and a `data` payload).
pub(crate) fn is_entity_map(map: &Map<String, Value>) -> bool {
    map.get("self").is_some_and(Value::is_string) && map.contains_key("data")
}

/// A node together with its typed property payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Node<T> {
    reference: NodeReference,
    data: T,
}

impl<T> Node<T> {
    pub fn new(reference: NodeReference, data: T) -> Self {
        Self { reference, data }
    }

    pub fn reference(&self) -> NodeReference {
        self.reference
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Node<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Repr<T> {
            #[serde(rename = "self")]
            self_link: String,
            data: T,
        }

        let repr = Repr::<T>::deserialize(deserializer)?;
        let id = id_from_link(&repr.self_link)
            .ok_or_else(|| D::Error::custom(format!("invalid node link '{}'", repr.self_link)))?;
        Ok(Node {
            reference: NodeReference::new(id),
            data: repr.data,
        })
    }
}

/// A relationship together with its endpoints and typed property payload.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipInstance<T> {
    reference: RelationshipReference,
    start_node: NodeReference,
    end_node: NodeReference,
    type_key: String,
    data: T,
}

impl<T> RelationshipInstance<T> {
    pub fn reference(&self) -> RelationshipReference {
        self.reference
    }

    pub fn start_node(&self) -> NodeReference {
        self.start_node
    }

    pub fn end_node(&self) -> NodeReference {
        self.end_node
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RelationshipInstance<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Repr<T> {
            #[serde(rename = "self")]
            self_link: String,
            start: String,
            end: String,
            #[serde(rename = "type")]
            type_key: String,
            data: T,
        }

        let repr = Repr::<T>::deserialize(deserializer)?;
        let link = |l: &str| {
            id_from_link(l).ok_or_else(|| D::Error::custom(format!("invalid entity link '{l}'")))
        };
        Ok(RelationshipInstance {
            reference: RelationshipReference::new(link(&repr.self_link)?),
            start_node: NodeReference::new(link(&repr.start)?),
            end_node: NodeReference::new(link(&repr.end)?),
            type_key: repr.type_key,
            data: repr.data,
        })
    }
}
