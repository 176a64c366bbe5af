//! Fluent Cypher query builder.
//!
//! Every method takes `&self` and returns a new builder, so a partially built query can be
//! branched freely:
//!
//! ```ignore
//! use cypher_fluent::{CypherFluentQuery, NodeReference, Node};
//!
//! let base = CypherFluentQuery::new()
//!     .start("me", NodeReference::new(123))
//!     .match_("me-[:FRIEND]-friend");
//!
//! let friends = base.return_::<Node<Person>>("friend").order_by("friend.Name");
//! let count = base.return_shape::<FriendCount>(|p| p.field("Total", ident("friend").count()));
//!
//! let people = friends.results(&client).await?;
//! ```

use crate::clause::{ClauseKind, ClauseWriter, Clauses};
use crate::client::{GraphClient, Transport};
use crate::entity::Node;
use crate::error::CypherResult;
use crate::param::ParamTable;
use crate::projection::{Projection, ProjectionShape};
use crate::render::{CypherQuery, PlaceholderStyle, ResultMode, render};
use crate::results::{CypherResponse, ResultDecoder, materialize_projection, materialize_set};
use crate::start::{StartBit, StartTarget};
use serde::de::DeserializeOwned;
use serde_json::Value;


/// Identifiers accepted by the bare return methods.
pub trait IntoIdentities {
    fn into_identities(self) -> Vec<String>;
}

impl IntoIdentities for &str {
    fn into_identities(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoIdentities for String {
    fn into_identities(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoIdentities for &[&str] {
    fn into_identities(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> IntoIdentities for [&str; N] {
    fn into_identities(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoIdentities for Vec<String> {
    fn into_identities(self) -> Vec<String> {
        self
    }
}

/// What the query returns, fixed by the last return call.
#[derive(Clone, Debug, PartialEq)]
pub enum ReturnSpec {
    /// `RETURN a, b`
    Set {
        identities: Vec<String>,
        distinct: bool,
    },
    /// `RETURN expr AS Field, ...`
    Projection {
        projection: Projection,
        distinct: bool,
    },
}

impl ReturnSpec {
    pub fn result_mode(&self) -> ResultMode {
        match self {
            ReturnSpec::Set { .. } => ResultMode::Set,
            ReturnSpec::Projection { .. } => ResultMode::Projection,
        }
    }

    fn write(&self, w: &mut ClauseWriter<'_>) {
        let distinct = match self {
            ReturnSpec::Set { distinct, .. } | ReturnSpec::Projection { distinct, .. } => *distinct,
        };
        let empty = match self {
            ReturnSpec::Set { identities, .. } => identities.iter().all(|i| i.trim().is_empty()),
            ReturnSpec::Projection { projection, .. } => projection.is_empty(),
        };
        if distinct {
            w.push(if empty { "distinct" } else { "distinct " });
        }
        if empty {
            return;
        }
        match self {
            ReturnSpec::Set { identities, .. } => {
                let items: Vec<&str> = identities
                    .iter()
                    .map(|i| i.trim())
                    .filter(|i| !i.is_empty())
                    .collect();
                w.push(&items.join(", "));
            }
            ReturnSpec::Projection { projection, .. } => projection.write(w),
        }
    }
}

/// An untyped query under construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CypherFluentQuery {
    clauses: Clauses,
    params: ParamTable,
    returns: Option<ReturnSpec>,
}

impl CypherFluentQuery {
    /// Start an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_clause<F>(&self, kind: ClauseKind, build: F) -> Self
    where
        F: FnOnce(&mut ClauseWriter<'_>),
    {
        let mut params = self.params.clone();
        let clauses = self.clauses.with_clause(&mut params, kind, build);
        Self {
            clauses,
            params,
            returns: self.returns.clone(),
        }
    }

    fn with_text(&self, kind: ClauseKind, text: &str) -> Self {
        self.with_clause(kind, |w| {
            w.push(text);
        })
    }

    // ==================== Reading clauses ====================

    /// Add a `START` bit: `identity=node({p})`, `identity=relationship({p})`, ...
    pub fn start(&self, identity: impl Into<String>, target: impl Into<StartTarget>) -> Self {
        self.start_bits([StartBit::new(identity, target)])
    }

    /// Add several `START` bits; they render comma-separated in one clause.
    pub fn start_bits<B: Into<StartBit>>(&self, bits: impl IntoIterator<Item = B>) -> Self {
        bits.into_iter().fold(self.clone(), |query, bit| {
            let bit = bit.into();
            query.with_clause(ClauseKind::Start, |w| bit.write(w))
        })
    }

    /// Add a `MATCH` pattern.
    pub fn match_(&self, pattern: &str) -> Self {
        self.with_text(ClauseKind::Match, pattern)
    }

    /// Add a `WHERE` condition. Several conditions are combined with `AND`.
    pub fn where_(&self, condition: &str) -> Self {
        self.with_text(ClauseKind::Where, condition)
    }

    /// Add a `WHERE` condition, binding one value for each `?`.
    ///
    /// ```ignore
    /// query.where_template("n.Age > ? AND n.Name = ?", [json!(18), json!("Bob")])
    /// // WHERE n.Age > {p0} AND n.Name = {p1}
    /// ```
    pub fn where_template<V: Into<Value>>(
        &self,
        template: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.with_clause(ClauseKind::Where, |w| {
            w.push_template(template, values);
        })
    }

    /// Add a `WITH` projection.
    pub fn with(&self, text: &str) -> Self {
        self.with_text(ClauseKind::With, text)
    }

    // ==================== Writing clauses ====================

    /// Add a `CREATE` pattern.
    pub fn create(&self, pattern: &str) -> Self {
        self.with_text(ClauseKind::Create, pattern)
    }

    /// Add a `SET` item.
    pub fn set(&self, item: &str) -> Self {
        self.with_text(ClauseKind::Set, item)
    }

    /// Add a `DELETE` item.
    pub fn delete(&self, identities: &str) -> Self {
        self.with_text(ClauseKind::Delete, identities)
    }

    // ==================== Ordering & pagination ====================

    /// Add an `ORDER BY` item.
    pub fn order_by(&self, item: &str) -> Self {
        self.with_text(ClauseKind::OrderBy, item)
    }

    /// Add an `ORDER BY item DESC` item.
    pub fn order_by_desc(&self, item: &str) -> Self {
        self.with_text(ClauseKind::OrderBy, &format!("{item} DESC"))
    }

    /// Set `SKIP`. The count is bound as a parameter.
    pub fn skip(&self, count: u64) -> Self {
        self.with_clause(ClauseKind::Skip, |w| {
            w.push_bind(count);
        })
    }

    /// Set `LIMIT`. The count is bound as a parameter.
    pub fn limit(&self, count: u64) -> Self {
        self.with_clause(ClauseKind::Limit, |w| {
            w.push_bind(count);
        })
    }

    // ==================== Return ====================

    fn with_return(&self, spec: ReturnSpec) -> Self {
        let mut query = self.with_clause(ClauseKind::Return, |w| spec.write(w));
        query.returns = Some(spec);
        query
    }

    fn bare<T>(
        &self,
        identities: impl IntoIdentities,
        distinct: bool,
        decoder: ResultDecoder<T>,
    ) -> TypedCypherQuery<T> {
        let identities = identities.into_identities();
        let columns = count_return_items(&identities);
        TypedCypherQuery {
            inner: self.with_return(ReturnSpec::Set {
                identities,
                distinct,
            }),
            materializer: Materializer::Set { decoder, columns },
        }
    }

    fn projected<T: DeserializeOwned>(
        &self,
        projection: Projection,
        distinct: bool,
    ) -> TypedCypherQuery<T> {
        TypedCypherQuery {
            inner: self.with_return(ReturnSpec::Projection {
                projection: projection.clone(),
                distinct,
            }),
            materializer: Materializer::Projection {
                projection,
                materialize: materialize_projection::<T>,
            },
        }
    }

    /// `RETURN a, b`; each column value is decoded as `T`.
    ///
    /// `T` may be [`Node<U>`] to keep node references.
    pub fn return_<T: DeserializeOwned>(&self, identities: impl IntoIdentities) -> TypedCypherQuery<T> {
        self.bare(identities, false, ResultDecoder::value())
    }

    /// `RETURN distinct a, b`
    pub fn return_distinct<T: DeserializeOwned>(
        &self,
        identities: impl IntoIdentities,
    ) -> TypedCypherQuery<T> {
        self.bare(identities, true, ResultDecoder::value())
    }

    /// `RETURN a`, decoding entity property payloads as `T`.
    pub fn return_entity<T: DeserializeOwned>(
        &self,
        identities: impl IntoIdentities,
    ) -> TypedCypherQuery<T> {
        self.bare(identities, false, ResultDecoder::entity())
    }

    /// `RETURN a`, decoding node payloads as [`Node<T>`].
    pub fn return_node<T: DeserializeOwned>(
        &self,
        identities: impl IntoIdentities,
    ) -> TypedCypherQuery<Node<T>> {
        self.bare(identities, false, ResultDecoder::node())
    }

    /// `RETURN a, b` with an explicit decoder.
    pub fn return_with<T>(
        &self,
        identities: impl IntoIdentities,
        decoder: ResultDecoder<T>,
    ) -> TypedCypherQuery<T> {
        self.bare(identities, false, decoder)
    }

    /// `RETURN distinct a, b` with an explicit decoder.
    pub fn return_distinct_with<T>(
        &self,
        identities: impl IntoIdentities,
        decoder: ResultDecoder<T>,
    ) -> TypedCypherQuery<T> {
        self.bare(identities, true, decoder)
    }

    /// `RETURN e1 AS F1, ...` from a shape-construction function.
    ///
    /// ```ignore
    /// query.return_shape::<Summary>(|p| p.field("Foo", ident("other")))
    /// ```
    pub fn return_shape<T: DeserializeOwned>(
        &self,
        shape: impl FnOnce(Projection) -> Projection,
    ) -> TypedCypherQuery<T> {
        self.projected(shape(Projection::new()), false)
    }

    /// `RETURN distinct e1 AS F1, ...` from a shape-construction function.
    pub fn return_distinct_shape<T: DeserializeOwned>(
        &self,
        shape: impl FnOnce(Projection) -> Projection,
    ) -> TypedCypherQuery<T> {
        self.projected(shape(Projection::new()), true)
    }

    /// `RETURN e1 AS F1, ...` using the projection declared by `T`.
    pub fn return_projection<T: ProjectionShape + DeserializeOwned>(&self) -> TypedCypherQuery<T> {
        self.projected(T::projection(), false)
    }

    /// `RETURN distinct e1 AS F1, ...` using the projection declared by `T`.
    pub fn return_distinct_projection<T: ProjectionShape + DeserializeOwned>(
        &self,
    ) -> TypedCypherQuery<T> {
        self.projected(T::projection(), true)
    }

    // ==================== Terminals ====================

    /// The current return specification, if any.
    pub fn return_spec(&self) -> Option<&ReturnSpec> {
        self.returns.as_ref()
    }

    /// The accumulated clause fragments.
    pub fn clauses(&self) -> &Clauses {
        &self.clauses
    }

    /// `None` until a return call.
    pub fn result_mode(&self) -> Option<ResultMode> {
        self.returns.as_ref().map(ReturnSpec::result_mode)
    }

    /// Render with `{pN}` placeholders. No network call.
    pub fn query(&self) -> CypherQuery {
        self.query_with(PlaceholderStyle::default())
    }

    /// Render with the given placeholder style. No network call.
    pub fn query_with(&self, style: PlaceholderStyle) -> CypherQuery {
        render(&self.clauses, &self.params, style, self.result_mode())
    }

    /// Execute and return the raw tabular response.
    pub async fn execute<C: Transport>(&self, client: &GraphClient<C>) -> CypherResult<CypherResponse> {
        client
            .execute_cypher(&self.query_with(client.config().placeholder_style))
            .await
    }
}

/// Number of comma-separated items in a bare return, ignoring commas nested in brackets or
/// string literals: `["a, count(b)", "c"]` returns three columns.
fn count_return_items(identities: &[String]) -> usize {
    identities
        .iter()
        .filter(|item| !item.trim().is_empty())
        .map(|item| {
            let mut depth = 0usize;
            let mut quote: Option<char> = None;
            let mut escaped = false;
            let mut count = 1;
            for ch in item.chars() {
                if let Some(q) = quote {
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == q {
                        quote = None;
                    }
                    continue;
                }
                match ch {
                    '\'' | '"' => quote = Some(ch),
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => depth = depth.saturating_sub(1),
                    ',' if depth == 0 => count += 1,
                    _ => {}
                }
            }
            count
        })
        .sum()
}

enum Materializer<T> {
    Set {
        decoder: ResultDecoder<T>,
        columns: usize,
    },
    Projection {
        projection: Projection,
        materialize: fn(CypherResponse, &Projection) -> CypherResult<Vec<T>>,
    },
}

impl<T> Clone for Materializer<T> {
    fn clone(&self) -> Self {
        match self {
            Materializer::Set { decoder, columns } => Materializer::Set {
                decoder: *decoder,
                columns: *columns,
            },
            Materializer::Projection {
                projection,
                materialize,
            } => Materializer::Projection {
                projection: projection.clone(),
                materialize: *materialize,
            },
        }
    }
}

/// A query with a fixed return shape; results materialize as `T`.
pub struct TypedCypherQuery<T> {
    inner: CypherFluentQuery,
    materializer: Materializer<T>,
}

impl<T> Clone for TypedCypherQuery<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            materializer: self.materializer.clone(),
        }
    }
}

impl<T> std::fmt::Debug for TypedCypherQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCypherQuery")
            .field("inner", &self.inner)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> TypedCypherQuery<T> {
    fn map(&self, f: impl FnOnce(&CypherFluentQuery) -> CypherFluentQuery) -> Self {
        Self {
            inner: f(&self.inner),
            materializer: self.materializer.clone(),
        }
    }

    /// Add an `ORDER BY` item.
    pub fn order_by(&self, item: &str) -> Self {
        self.map(|q| q.order_by(item))
    }

    /// Add an `ORDER BY item DESC` item.
    pub fn order_by_desc(&self, item: &str) -> Self {
        self.map(|q| q.order_by_desc(item))
    }

    /// Set `SKIP`.
    pub fn skip(&self, count: u64) -> Self {
        self.map(|q| q.skip(count))
    }

    /// Set `LIMIT`.
    pub fn limit(&self, count: u64) -> Self {
        self.map(|q| q.limit(count))
    }

    /// The untyped builder underneath.
    pub fn as_untyped(&self) -> &CypherFluentQuery {
        &self.inner
    }

    pub fn result_mode(&self) -> ResultMode {
        match self.materializer {
            Materializer::Set { .. } => ResultMode::Set,
            Materializer::Projection { .. } => ResultMode::Projection,
        }
    }

    /// Render with `{pN}` placeholders. No network call.
    pub fn query(&self) -> CypherQuery {
        self.inner.query()
    }

    /// Render with the given placeholder style. No network call.
    pub fn query_with(&self, style: PlaceholderStyle) -> CypherQuery {
        self.inner.query_with(style)
    }

    /// Map an already-fetched response according to the return shape.
    pub fn materialize(&self, response: CypherResponse) -> CypherResult<Vec<T>> {
        match &self.materializer {
            Materializer::Set { decoder, columns } => {
                materialize_set(response, *columns, decoder)
            }
            Materializer::Projection {
                projection,
                materialize,
            } => materialize(response, projection),
        }
    }

    /// Execute and materialize every row.
    pub async fn results<C: Transport>(&self, client: &GraphClient<C>) -> CypherResult<Vec<T>> {
        let response = self.inner.execute(client).await?;
        self.materialize(response)
    }
}
