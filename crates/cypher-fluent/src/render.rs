//! Rendering accumulated clauses into query text.

use crate::clause::{Clause, ClauseKind, Clauses, Part};
use crate::param::ParamTable;
use serde::Serialize;

/// Separator between rendered clause lines.
pub const LINE_SEPARATOR: &str = "\n";

/// How parameter references are written into the query text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `{p0}`, the syntax understood by the REST Cypher endpoint.
    #[default]
    Braces,
    /// `$p0`
    Dollar,
}

impl PlaceholderStyle {
    /// Placeholder text for a parameter name.
    pub fn placeholder(self, name: &str) -> String {
        match self {
            PlaceholderStyle::Braces => format!("{{{name}}}"),
            PlaceholderStyle::Dollar => format!("${name}"),
        }
    }
}

/// How result rows are materialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultMode {
    /// Each row holds whole bound identifiers.
    Set,
    /// Each row holds the columns of a caller-defined projection.
    Projection,
}

/// A rendered query: text, parameters and result mode.
#[derive(Clone, Debug, PartialEq)]
pub struct CypherQuery {
    text: String,
    parameters: ParamTable,
    result_mode: Option<ResultMode>,
}

impl CypherQuery {
    /// Wrap already-rendered text, e.g. a hand-written query.
    pub fn new(
        text: impl Into<String>,
        parameters: ParamTable,
        result_mode: Option<ResultMode>,
    ) -> Self {
        Self {
            text: text.into(),
            parameters,
            result_mode,
        }
    }

    pub fn query_text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &ParamTable {
        &self.parameters
    }

    /// `None` until a return clause has been added.
    pub fn result_mode(&self) -> Option<ResultMode> {
        self.result_mode
    }

    /// Request body for the Cypher endpoint.
    pub fn to_request(&self) -> CypherRequest<'_> {
        CypherRequest {
            query: &self.text,
            params: &self.parameters,
        }
    }
}

/// Wire shape of a Cypher request: `{"query": ..., "params": {...}}`.
#[derive(Debug, Serialize)]
pub struct CypherRequest<'a> {
    pub query: &'a str,
    pub params: &'a ParamTable,
}

/// Render the accumulated clauses.
///
/// Each kind is emitted once, in [`ClauseKind::PRECEDENCE`] order, regardless of the order in
/// which fragments were added. Rendering is pure: the same input always yields the same text.
pub fn render(
    clauses: &Clauses,
    params: &ParamTable,
    style: PlaceholderStyle,
    result_mode: Option<ResultMode>,
) -> CypherQuery {
    let mut lines: Vec<String> = Vec::new();

    for kind in ClauseKind::PRECEDENCE {
        let bits: Vec<String> = clauses
            .of_kind(kind)
            .map(|clause| render_clause(clause, style))
            .collect();
        if bits.is_empty() {
            continue;
        }

        let body = if kind == ClauseKind::Where && bits.len() > 1 {
            bits.iter()
                .map(|b| format!("({b})"))
                .collect::<Vec<_>>()
                .join(kind.bit_separator())
        } else {
            bits.join(kind.bit_separator())
        };

        if body.is_empty() {
            lines.push(kind.keyword().to_string());
        } else {
            lines.push(format!("{} {}", kind.keyword(), body));
        }
    }

    CypherQuery {
        text: lines.join(LINE_SEPARATOR),
        parameters: params.clone(),
        result_mode,
    }
}

fn render_clause(clause: &Clause, style: PlaceholderStyle) -> String {
    let mut out = String::new();
    for part in clause.parts() {
        match part {
            Part::Raw(s) => out.push_str(s),
            Part::Param(name) => out.push_str(&style.placeholder(name)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> (Clauses, ParamTable) {
        let mut params = ParamTable::new();
        let clauses = Clauses::new()
            .with_clause(&mut params, ClauseKind::Limit, |w| {
                w.push_bind(5);
            })
            .with_clause(&mut params, ClauseKind::Start, |w| {
                w.push("n=node(").push_bind(3).push(")");
            })
            .with_clause(&mut params, ClauseKind::Return, |w| {
                w.push("n");
            });
        (clauses, params)
    }

    #[test]
    fn renders_in_precedence_order() {
        let (clauses, params) = sample();
        let query = render(&clauses, &params, PlaceholderStyle::Braces, None);
        assert_eq!(
            query.query_text(),
            "START n=node({p1})\nRETURN n\nLIMIT {p0}"
        );
        assert_eq!(query.parameters()["p0"], json!(5));
        assert_eq!(query.parameters()["p1"], json!(3));
    }

    #[test]
    fn empty_clause_renders_bare_keyword() {
        let mut params = ParamTable::new();
        let clauses = Clauses::new()
            .with_clause(&mut params, ClauseKind::Match, |w| {
                w.push("a-->b");
            })
            .with_clause(&mut params, ClauseKind::Return, |_| {});
        let query = render(&clauses, &params, PlaceholderStyle::Braces, None);
        assert_eq!(query.query_text(), "MATCH a-->b\nRETURN");
    }

    #[test]
    fn dollar_placeholders() {
        let (clauses, params) = sample();
        let query = render(&clauses, &params, PlaceholderStyle::Dollar, None);
        assert_eq!(query.query_text(), "START n=node($p1)\nRETURN n\nLIMIT $p0");
    }

    #[test]
    fn multiple_where_bits_are_parenthesized() {
        let mut params = ParamTable::new();
        let clauses = Clauses::new()
            .with_clause(&mut params, ClauseKind::Where, |w| {
                w.push("a.x = 1 OR a.y = 2");
            })
            .with_clause(&mut params, ClauseKind::Where, |w| {
                w.push("a.z > ").push_bind(0);
            });
        let query = render(&clauses, &params, PlaceholderStyle::Braces, None);
        assert_eq!(
            query.query_text(),
            "WHERE (a.x = 1 OR a.y = 2) AND (a.z > {p0})"
        );
    }

    #[test]
    fn empty_accumulator_renders_empty_text() {
        let query = render(
            &Clauses::new(),
            &ParamTable::new(),
            PlaceholderStyle::Braces,
            None,
        );
        assert_eq!(query.query_text(), "");
        assert!(query.parameters().is_empty());
    }

    #[test]
    fn request_body_shape() {
        let (clauses, params) = sample();
        let query = render(&clauses, &params, PlaceholderStyle::Braces, None);
        let body = serde_json::to_value(query.to_request()).unwrap();
        assert_eq!(
            body,
            json!({
                "query": "START n=node({p1})\nRETURN n\nLIMIT {p0}",
                "params": {"p0": 5, "p1": 3}
            })
        );
    }
}
