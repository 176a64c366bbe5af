//! Declarative projections for `RETURN expr AS Field, ...`.
//!
//! A projection is an ordered list of `(field, expression)` pairs. Expressions are a small tree
//! restricted to identifier access, property access and a handful of functions, so the pairs can
//! be enumerated without running anything against real data.
//!
//! # Example
//!
//! ```ignore
//! use cypher_fluent::{ident, Projection};
//!
//! let shape = Projection::new()
//!     .field("Name", ident("person").prop("Name"))
//!     .field("Friends", ident("friend").count());
//! assert_eq!(shape.to_cypher(), "person.Name AS Name, count(friend) AS Friends");
//! ```

use crate::clause::ClauseWriter;

/// Expression over query identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProjectionExpr {
    /// A bound identifier: `n`
    Identity(String),
    /// Property access: `n.Name`
    Property {
        base: Box<ProjectionExpr>,
        name: String,
    },
    /// Single-argument function call: `count(n)`, `collect(distinct n)`
    Function {
        name: &'static str,
        arg: Box<ProjectionExpr>,
        distinct: bool,
    },
    /// `count(*)`
    CountAll,
    /// Literal expression text, passed through untouched.
    Raw(String),
}

/// Reference a bound identifier.
pub fn ident(name: impl Into<String>) -> ProjectionExpr {
    ProjectionExpr::Identity(name.into())
}

impl ProjectionExpr {
    /// Literal expression text.
    pub fn raw(text: impl Into<String>) -> Self {
        ProjectionExpr::Raw(text.into())
    }

    /// `count(*)`
    pub fn count_all() -> Self {
        ProjectionExpr::CountAll
    }

    /// `self.name`
    pub fn prop(self, name: impl Into<String>) -> Self {
        ProjectionExpr::Property {
            base: Box::new(self),
            name: name.into(),
        }
    }

    fn call(self, name: &'static str, distinct: bool) -> Self {
        ProjectionExpr::Function {
            name,
            arg: Box::new(self),
            distinct,
        }
    }

    /// `id(self)`
    pub fn id(self) -> Self {
        self.call("id", false)
    }

    /// `type(self)`, for relationships.
    pub fn rel_type(self) -> Self {
        self.call("type", false)
    }

    /// `count(self)`
    pub fn count(self) -> Self {
        self.call("count", false)
    }

    /// `count(distinct self)`
    pub fn count_distinct(self) -> Self {
        self.call("count", true)
    }

    /// `collect(self)`
    pub fn collect(self) -> Self {
        self.call("collect", false)
    }

    /// `collect(distinct self)`
    pub fn collect_distinct(self) -> Self {
        self.call("collect", true)
    }

    /// Render the expression text.
    pub fn to_cypher(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        match self {
            ProjectionExpr::Identity(name) | ProjectionExpr::Raw(name) => out.push_str(name),
            ProjectionExpr::Property { base, name } => {
                base.write_to(out);
                out.push('.');
                out.push_str(name);
            }
            ProjectionExpr::Function {
                name,
                arg,
                distinct,
            } => {
                out.push_str(name);
                out.push('(');
                if *distinct {
                    out.push_str("distinct ");
                }
                arg.write_to(out);
                out.push(')');
            }
            ProjectionExpr::CountAll => out.push_str("count(*)"),
        }
    }
}

impl From<&str> for ProjectionExpr {
    fn from(text: &str) -> Self {
        ProjectionExpr::Raw(text.to_string())
    }
}

impl From<String> for ProjectionExpr {
    fn from(text: String) -> Self {
        ProjectionExpr::Raw(text)
    }
}

/// One output column: the field it fills and the expression producing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectedField {
    pub name: String,
    pub expr: String,
}

/// Ordered `(field, expression)` pairs describing a projection result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<ProjectedField>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output field. Column order follows call order.
    pub fn field(mut self, name: impl Into<String>, expr: impl Into<ProjectionExpr>) -> Self {
        self.fields.push(ProjectedField {
            name: name.into(),
            expr: expr.into().to_cypher(),
        });
        self
    }

    pub fn fields(&self) -> &[ProjectedField] {
        &self.fields
    }

    /// Field names in column order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `expr1 AS Field1, expr2 AS Field2, ...`
    pub fn to_cypher(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{} AS {}", f.expr, f.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn write(&self, w: &mut ClauseWriter<'_>) {
        w.push(&self.to_cypher());
    }
}

/// A record type whose projection is known statically.
///
/// Usually derived with `#[derive(Projection)]`:
///
/// ```ignore
/// #[derive(Deserialize, Projection)]
/// struct Summary {
///     #[cypher(expr = "other")]
///     foo: i64,
/// }
/// ```
pub trait ProjectionShape {
    /// The `(field, expression)` pairs, in column order.
    fn projection() -> Projection;
}
