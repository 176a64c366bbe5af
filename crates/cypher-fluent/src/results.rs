//! Mapping response rows into typed records.

use crate::entity::{Node, is_entity_map};
use crate::error::{CypherError, CypherResult};
use crate::projection::Projection;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Tabular response of the Cypher endpoint: `{"columns": [...], "data": [[...], ...]}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CypherResponse {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Value>>,
}

impl CypherResponse {
    /// Parse a response body.
    pub fn from_body(body: &str) -> CypherResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The declared element type of a bare return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnKind {
    /// The column value is decoded as-is.
    Primitive,
    /// Entity payloads are unwrapped to their `data` before decoding.
    Entity,
    /// The column value is a node payload decoded into [`Node<T>`].
    Node,
}

/// Explicit conversion applied to every value of a bare return.
pub struct ResultDecoder<T> {
    kind: ReturnKind,
    decode: fn(Value) -> Result<T, serde_json::Error>,
}

impl<T> Clone for ResultDecoder<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ResultDecoder<T> {}

impl<T> std::fmt::Debug for ResultDecoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultDecoder")
            .field("kind", &self.kind)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned> ResultDecoder<T> {
    /// Decode column values as-is.
    pub fn value() -> Self {
        Self {
            kind: ReturnKind::Primitive,
            decode: serde_json::from_value,
        }
    }

    /// Decode the property payload of entity values.
    ///
    /// Non-entity values (scalars, maps) are decoded as-is; arrays are unwrapped element-wise.
    pub fn entity() -> Self {
        Self {
            kind: ReturnKind::Entity,
            decode: |value| serde_json::from_value(unwrap_entities(value)),
        }
    }
}

impl<T: DeserializeOwned> ResultDecoder<Node<T>> {
    /// Decode node payloads into [`Node<T>`].
    pub fn node() -> Self {
        Self {
            kind: ReturnKind::Node,
            decode: serde_json::from_value,
        }
    }
}

impl<T> ResultDecoder<T> {
    pub fn kind(&self) -> ReturnKind {
        self.kind
    }

    pub fn decode(&self, value: Value) -> Result<T, serde_json::Error> {
        (self.decode)(value)
    }
}

fn unwrap_entities(value: Value) -> Value {
    match value {
        Value::Object(mut map) if is_entity_map(&map) => map.remove("data").unwrap_or(Value::Null),
        Value::Array(items) => Value::Array(items.into_iter().map(unwrap_entities).collect()),
        other => other,
    }
}

fn check_width(expected: usize, got: usize) -> CypherResult<()> {
    if expected != got {
        return Err(CypherError::ShapeMismatch { expected, got });
    }
    Ok(())
}

/// Materialize a Set-mode response.
///
/// The response must carry exactly `expected_columns` columns, one per returned item. A
/// one-column row decodes its single value; wider rows decode the whole row as an array, so
/// tuples work as the target type.
pub fn materialize_set<T>(
    response: CypherResponse,
    expected_columns: usize,
    decoder: &ResultDecoder<T>,
) -> CypherResult<Vec<T>> {
    let CypherResponse { columns, data } = response;
    check_width(expected_columns, columns.len())?;
    let width = columns.len();

    data.into_iter()
        .enumerate()
        .map(|(i, row)| {
            check_width(width, row.len())?;
            let (column, value) = match <[Value; 1]>::try_from(row) {
                Ok([single]) => (columns[0].clone(), single),
                Err(row) => (columns.join(", "), Value::Array(row)),
            };
            decoder
                .decode(value)
                .map_err(|e| CypherError::decode(i, column, e.to_string()))
        })
        .collect()
}

/// Materialize a Projection-mode response.
///
/// Column `i` fills projection field `i`; the server's column names are not consulted.
pub fn materialize_projection<T: DeserializeOwned>(
    response: CypherResponse,
    projection: &Projection,
) -> CypherResult<Vec<T>> {
    let CypherResponse { columns, data } = response;
    check_width(projection.len(), columns.len())?;

    data.into_iter()
        .enumerate()
        .map(|(i, row)| {
            check_width(projection.len(), row.len())?;
            let record: Map<String, Value> = projection
                .field_names()
                .map(str::to_string)
                .zip(row)
                .collect();
            serde_json::from_value(Value::Object(record))
                .map_err(|e| CypherError::decode(i, columns.join(", "), e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ident;
    use crate::start::NodeReference;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Foo {
        #[serde(rename = "Foo")]
        foo: i32,
    }

    fn response(columns: &[&str], data: Value) -> CypherResponse {
        CypherResponse {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            data: serde_json::from_value(data).unwrap(),
        }
    }

    #[test]
    fn projection_rows_map_positionally() {
        let projection = Projection::new().field("Foo", ident("other"));
        let rows: Vec<Foo> =
            materialize_projection(response(&["Foo"], json!([[1], [2], [3]])), &projection)
                .unwrap();
        assert_eq!(rows, [Foo { foo: 1 }, Foo { foo: 2 }, Foo { foo: 3 }]);
    }

    #[test]
    fn projection_ignores_server_column_names() {
        let projection = Projection::new().field("Foo", ident("other"));
        let rows: Vec<Foo> =
            materialize_projection(response(&["other"], json!([[7]])), &projection).unwrap();
        assert_eq!(rows, [Foo { foo: 7 }]);
    }

    #[test]
    fn projection_column_count_mismatch() {
        let projection = Projection::new().field("Foo", ident("other"));
        let err = materialize_projection::<Foo>(
            response(&["Foo", "Bar"], json!([[1, 2]])),
            &projection,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CypherError::ShapeMismatch {
                expected: 1,
                got: 2
            }
        ));
    }

    #[test]
    fn projection_decode_error_aborts() {
        let projection = Projection::new().field("Foo", ident("other"));
        let err = materialize_projection::<Foo>(
            response(&["Foo"], json!([[1], ["two"], [3]])),
            &projection,
        )
        .unwrap_err();
        match err {
            CypherError::Decode { row, .. } => assert_eq!(row, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn set_rows_decode_single_column() {
        let rows = materialize_set(
            response(&["n"], json!([[1], [2]])),
            1,
            &ResultDecoder::<i64>::value(),
        )
        .unwrap();
        assert_eq!(rows, [1, 2]);
    }

    #[test]
    fn set_rows_decode_wide_rows_as_tuples() {
        let rows = materialize_set(
            response(&["a", "b"], json!([[1, "x"], [2, "y"]])),
            2,
            &ResultDecoder::<(i64, String)>::value(),
        )
        .unwrap();
        assert_eq!(rows, [(1, "x".to_string()), (2, "y".to_string())]);
    }

    #[test]
    fn set_row_width_mismatch() {
        let err = materialize_set(
            response(&["a", "b"], json!([[1]])),
            2,
            &ResultDecoder::<Value>::value(),
        )
        .unwrap_err();
        assert!(err.is_deserialization());
    }

    #[test]
    fn set_extra_columns_are_rejected() {
        let err = materialize_set(
            response(&["n", "m"], json!([[1, 2]])),
            1,
            &ResultDecoder::<Value>::value(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CypherError::ShapeMismatch {
                expected: 1,
                got: 2
            }
        ));
    }

    #[test]
    fn set_missing_columns_are_rejected() {
        let err = materialize_set(
            response(&["a"], json!([[1]])),
            2,
            &ResultDecoder::<(i64, i64)>::value(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CypherError::ShapeMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn entity_decoder_unwraps_payload() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Person {
            name: String,
        }

        let rows = materialize_set(
            response(
                &["n"],
                json!([[{"self": "http://localhost:7474/db/data/node/1", "data": {"name": "Ada"}}]]),
            ),
            1,
            &ResultDecoder::<Person>::entity(),
        )
        .unwrap();
        assert_eq!(
            rows,
            [Person {
                name: "Ada".to_string()
            }]
        );
    }

    #[test]
    fn node_decoder_keeps_reference() {
        let rows = materialize_set(
            response(
                &["n"],
                json!([[{"self": "http://localhost:7474/db/data/node/5", "data": {}}]]),
            ),
            1,
            &ResultDecoder::<Node<Value>>::node(),
        )
        .unwrap();
        assert_eq!(rows[0].reference(), NodeReference::new(5));
        assert_eq!(ResultDecoder::<Node<Value>>::node().kind(), ReturnKind::Node);
    }

    #[test]
    fn set_decode_error_names_column() {
        let err = materialize_set(
            response(&["n"], json!([["nope"]])),
            1,
            &ResultDecoder::<i64>::value(),
        )
        .unwrap_err();
        match err {
            CypherError::Decode { row, column, .. } => {
                assert_eq!(row, 0);
                assert_eq!(column, "n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
