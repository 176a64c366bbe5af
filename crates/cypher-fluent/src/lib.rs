//! # cypher-fluent
//!
//! A fluent, parameter-safe Cypher query builder with typed result projection.
//!
//! ## Features
//!
//! - **Immutable chaining**: every builder call returns a new value, so partial queries can be
//!   branched and shared across threads
//! - **Parameters, not literals**: node ids, `SKIP`/`LIMIT` counts and template values are bound
//!   as `{p0}`, `{p1}`, ... in call order
//! - **Fixed clause order**: `START, MATCH, WHERE, CREATE, SET, DELETE, WITH, RETURN, ORDER BY,
//!   SKIP, LIMIT`, whatever order the calls were made in
//! - **Typed results**: bare returns decode each row into `T`, projections map column `i` onto
//!   field `i` of a record
//! - **Pluggable transport**: bring your own HTTP stack through [`Transport`]
//!
//! ## Example
//!
//! ```ignore
//! use cypher_fluent::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, Projection)]
//! struct Friend {
//!     #[cypher(expr = "friend.Name")]
//!     name: String,
//!     #[cypher(expr = "count(mutual)")]
//!     mutual: u32,
//! }
//!
//! let client = GraphClient::connect(transport, ClientConfig::default()).await?;
//!
//! let friends = client
//!     .cypher()
//!     .start("me", NodeReference::new(123))
//!     .match_("me-[:FRIEND]-mutual-[:FRIEND]-friend")
//!     .where_("not(me-[:FRIEND]-friend)")
//!     .return_projection::<Friend>()
//!     .order_by_desc("count(mutual)")
//!     .limit(10)
//!     .results(&client)
//!     .await?;
//! ```
//!
//! Rendering needs no client:
//!
//! ```ignore
//! let query = CypherFluentQuery::new()
//!     .start("n", NodeReference::new(3))
//!     .return_distinct::<serde_json::Value>("n")
//!     .limit(5)
//!     .query();
//!
//! assert_eq!(query.query_text(), "START n=node({p0})\nRETURN distinct n\nLIMIT {p1}");
//! ```

pub mod builder;
pub mod clause;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod param;
pub mod prelude;
pub mod projection;
pub mod render;
pub mod results;
pub mod start;

pub use builder::{CypherFluentQuery, IntoIdentities, ReturnSpec, TypedCypherQuery};
pub use clause::{Clause, ClauseKind, ClauseWriter, Clauses};
pub use client::{GraphClient, HttpResponse, QUERY_TARGET, Transport};
pub use config::{ClientConfig, DEFAULT_CYPHER_PATH};
pub use entity::{Node, RelationshipInstance};
pub use error::{CypherError, CypherResult, ErrorKind};
pub use param::ParamTable;
pub use projection::{ProjectedField, Projection, ProjectionExpr, ProjectionShape, ident};
pub use render::{CypherQuery, CypherRequest, LINE_SEPARATOR, PlaceholderStyle, ResultMode};
pub use results::{CypherResponse, ResultDecoder, ReturnKind};
pub use start::{NodeReference, RelationshipReference, StartBit, StartTarget};

#[cfg(feature = "derive")]
pub use cypher_fluent_derive::Projection;
