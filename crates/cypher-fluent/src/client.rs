//! Execution facade: sends rendered queries through a [`Transport`].

use crate::builder::CypherFluentQuery;
use crate::config::ClientConfig;
use crate::entity::id_from_link;
use crate::error::{CypherError, CypherResult};
use crate::render::CypherQuery;
use crate::results::CypherResponse;
use crate::start::NodeReference;
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;

/// Tracing target for query events.
pub const QUERY_TARGET: &str = "cypher_fluent.query";

/// Raw HTTP answer handed back by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP stack the client talks through.
///
/// Implementations own connection management, authentication, timeouts and retries; the
/// client performs exactly one call per query.
pub trait Transport: Send + Sync {
    /// POST a JSON body to `path`.
    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = CypherResult<HttpResponse>> + Send;

    /// GET `path`. Only needed for [`GraphClient::connect`].
    fn get(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = CypherResult<HttpResponse>> + Send {
        let path = path.to_string();
        async move {
            Err(CypherError::transport(format!(
                "GET {path} is not supported by this transport"
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceRoot {
    reference_node: Option<String>,
    cypher: Option<String>,
}

/// Client bound to one graph service.
#[derive(Debug, Clone)]
pub struct GraphClient<T> {
    transport: T,
    config: ClientConfig,
    root_node: Option<NodeReference>,
}

impl<T: Transport> GraphClient<T> {
    /// Wrap a transport without contacting the service.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            root_node: None,
        }
    }

    /// Set the root node explicitly.
    pub fn with_root_node(mut self, root: NodeReference) -> Self {
        self.root_node = Some(root);
        self
    }

    /// Read the service root and discover the reference node and the Cypher endpoint.
    pub async fn connect(transport: T, config: ClientConfig) -> CypherResult<Self> {
        let response = transport.get(&config.root_path).await?;
        if !response.is_success() {
            return Err(CypherError::connection(format!(
                "service root returned HTTP {}",
                response.status
            )));
        }

        let root: ServiceRoot = serde_json::from_str(&response.body)
            .map_err(|e| CypherError::connection(format!("invalid service root: {e}")))?;

        let cypher = root.cypher.ok_or_else(|| {
            CypherError::connection("service root does not expose a cypher endpoint")
        })?;
        let root_node = match root.reference_node.as_deref() {
            Some(link) => Some(id_from_link(link).map(NodeReference::new).ok_or_else(|| {
                CypherError::connection(format!("invalid reference node link '{link}'"))
            })?),
            None => None,
        };

        let config = config.cypher_path(endpoint_path(&cypher));
        if config.logging_enabled {
            tracing::debug!(
                target: QUERY_TARGET,
                cypher_path = %config.cypher_path,
                root_node = ?root_node,
                "connected to graph service"
            );
        }

        Ok(Self {
            transport,
            config,
            root_node,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The service's reference node, usable as a START argument.
    pub fn root_node(&self) -> Option<NodeReference> {
        self.root_node
    }

    /// Start a new query.
    pub fn cypher(&self) -> CypherFluentQuery {
        CypherFluentQuery::new()
    }

    /// Send one rendered query and parse the tabular response.
    pub async fn execute_cypher(&self, query: &CypherQuery) -> CypherResult<CypherResponse> {
        let body = serde_json::to_value(query.to_request())?;

        if self.config.logging_enabled {
            tracing::debug!(
                target: QUERY_TARGET,
                query = %self.truncate_query(query.query_text()),
                params = query.parameters().len(),
                mode = ?query.result_mode(),
                "executing cypher query"
            );
        }

        let start = Instant::now();
        let response = self.transport.post(&self.config.cypher_path, &body).await?;
        let elapsed = start.elapsed();

        if let Some(threshold) = self.config.slow_query_threshold
            && elapsed > threshold
        {
            tracing::warn!(
                target: QUERY_TARGET,
                query = %self.truncate_query(query.query_text()),
                duration_ms = elapsed.as_millis() as u64,
                threshold_ms = threshold.as_millis() as u64,
                "slow cypher query"
            );
        }

        if !response.is_success() {
            let err = CypherError::from_response(response.status, &response.body);
            if self.config.logging_enabled {
                tracing::debug!(target: QUERY_TARGET, status = response.status, error = %err, "cypher query rejected");
            }
            return Err(err);
        }

        CypherResponse::from_body(&response.body)
    }

    fn truncate_query(&self, text: &str) -> String {
        match self.config.max_logged_query_length {
            Some(max) if text.len() > max => format!("{}...", truncate_bytes(text, max)),
            _ => text.to_string(),
        }
    }
}

/// Path component of an endpoint link; bare paths pass through.
fn endpoint_path(link: &str) -> String {
    match url::Url::parse(link) {
        Ok(url) => url.path().trim_end_matches('/').to_string(),
        Err(_) => link.trim_end_matches('/').to_string(),
    }
}

fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ServiceRootOnly;

    impl Transport for ServiceRootOnly {
        fn post(
            &self,
            _path: &str,
            _body: &Value,
        ) -> impl std::future::Future<Output = CypherResult<HttpResponse>> + Send {
            std::future::ready(Err(CypherError::transport("unexpected POST")))
        }

        fn get(
            &self,
            _path: &str,
        ) -> impl std::future::Future<Output = CypherResult<HttpResponse>> + Send {
            std::future::ready(Ok(HttpResponse::new(
                200,
                r#"{"reference_node":"http://localhost:7474/db/data/node/0","cypher":"http://localhost:7474/db/data/cypher"}"#,
            )))
        }
    }

    /// Counts events emitted under [`QUERY_TARGET`].
    struct QueryEventCounter(Arc<AtomicUsize>);

    impl tracing::Subscriber for QueryEventCounter {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            if event.metadata().target() == QUERY_TARGET {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[tokio::test]
    async fn bootstrap_event_follows_logging_switch() {
        let events = Arc::new(AtomicUsize::new(0));
        let _guard = tracing::subscriber::set_default(QueryEventCounter(events.clone()));

        GraphClient::connect(ServiceRootOnly, ClientConfig::new().disable_logging())
            .await
            .unwrap();
        assert_eq!(events.load(Ordering::SeqCst), 0);

        GraphClient::connect(ServiceRootOnly, ClientConfig::new())
            .await
            .unwrap();
        assert_eq!(events.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_bytes("MATCH n", 100), "MATCH n");
        assert_eq!(truncate_bytes("héllo", 2), "h");
        assert_eq!(truncate_bytes("héllo", 3), "hé");
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(
            endpoint_path("http://localhost:7474/db/data/cypher"),
            "/db/data/cypher"
        );
        assert_eq!(endpoint_path("/db/data/cypher/"), "/db/data/cypher");
    }

    #[test]
    fn success_statuses() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(400, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
