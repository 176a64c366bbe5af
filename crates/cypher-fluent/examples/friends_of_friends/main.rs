//! Example demonstrating the fluent builder, projections and typed results.
//!
//! Run with:
//!   cargo run --example friends_of_friends -p cypher-fluent
//!
//! The transport below answers from memory; plug in any HTTP client to talk to a real server.

use cypher_fluent::prelude::*;
use cypher_fluent::HttpResponse;
use serde::Deserialize;
use serde_json::{Value, json};

/// Answers the service root and every Cypher request with canned payloads.
struct CannedTransport;

impl Transport for CannedTransport {
    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = CypherResult<HttpResponse>> + Send {
        println!("POST {path}\n{}\n", serde_json::to_string_pretty(body).unwrap_or_default());
        let answer = json!({
            "columns": ["Name", "Mutual"],
            "data": [["Carol", 3], ["Dave", 1]]
        });
        std::future::ready(Ok(HttpResponse::new(200, answer.to_string())))
    }

    fn get(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = CypherResult<HttpResponse>> + Send {
        println!("GET {path}\n");
        let root = json!({
            "reference_node": "http://localhost:7474/db/data/node/0",
            "cypher": "http://localhost:7474/db/data/cypher"
        });
        std::future::ready(Ok(HttpResponse::new(200, root.to_string())))
    }
}

#[derive(Debug, Deserialize, Projection)]
#[serde(rename_all = "PascalCase")]
#[cypher(rename_all = "PascalCase")]
struct Suggestion {
    #[cypher(expr = "fof.Name")]
    name: String,
    #[cypher(expr = "count(friend)")]
    mutual: u32,
}

#[tokio::main]
async fn main() -> CypherResult<()> {
    let client =
        GraphClient::connect(CannedTransport, ClientConfig::new().root_path("/db/data/")).await?;
    let root = client
        .root_node()
        .ok_or_else(|| CypherError::connection("no reference node"))?;

    let base = client
        .cypher()
        .start("me", root)
        .match_("me-[:FRIEND]-friend-[:FRIEND]-fof")
        .where_("not(me-[:FRIEND]-fof)")
        .where_template("fof.Age >= ?", [18]);

    // Render only; no request is sent.
    let preview = base.return_::<Node<Value>>("fof").limit(25).query();
    println!("preview:\n{}\nparams = {}\n", preview.query_text(), preview.parameters().to_json());

    let suggestions = base
        .return_projection::<Suggestion>()
        .order_by_desc("count(friend)")
        .limit(10)
        .results(&client)
        .await?;

    for s in &suggestions {
        println!("- {} ({} mutual friends)", s.name, s.mutual);
    }

    Ok(())
}
