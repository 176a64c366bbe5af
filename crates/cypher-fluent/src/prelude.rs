//! Convenient imports for typical `cypher-fluent` usage.
//!
//! ```ignore
//! use cypher_fluent::prelude::*;
//! ```

pub use crate::{
    ClientConfig, CypherError, CypherFluentQuery, CypherResult, GraphClient, Node, NodeReference,
    PlaceholderStyle, Projection, ProjectionShape, RelationshipInstance, RelationshipReference,
    ResultDecoder, StartBit, Transport, ident,
};
