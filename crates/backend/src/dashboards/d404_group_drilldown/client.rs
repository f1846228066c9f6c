use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use contracts::dashboards::d404_group_drilldown::ErrorKind;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use super::query::AggregationQuery;
use crate::shared::config::AggregationConfig;

/// One result row of the aggregation service, keyed by member name
pub type UpstreamRow = Map<String, Value>;

/// Answer of `/load` while the query is still being computed
const CONTINUE_WAIT: &str = "Continue wait";

/// Pause before asking again for a result that is not ready
const CONTINUE_WAIT_DELAY: Duration = Duration::from_millis(500);

/// Ошибки обращения к сервису агрегации
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode aggregation response: {0}")]
    Decode(String),

    #[error("Aggregation service error: {0}")]
    Upstream(String),

    #[error("Aggregation result is not ready yet")]
    Pending,
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::Upstream(_) => ErrorKind::Application,
            SourceError::Network(_)
            | SourceError::Http { .. }
            | SourceError::Decode(_)
            | SourceError::Pending => ErrorKind::Transport,
        }
    }
}

/// Трейт для источника агрегированных данных
#[async_trait]
pub trait AggregationSource: Send + Sync {
    async fn load(&self, query: &AggregationQuery) -> Result<Vec<UpstreamRow>, SourceError>;
}

/// HTTP client for the `/load` endpoint of the aggregation service
pub struct HttpAggregationSource {
    client: reqwest::Client,
    load_url: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HttpAggregationSource {
    pub fn new(config: &AggregationConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            load_url: format!("{}/load", config.base_url.trim_end_matches('/')),
            api_token: config.api_token.clone(),
            timeout,
        })
    }

    fn load_request(&self, query: &AggregationQuery) -> reqwest::RequestBuilder {
        let request = self
            .client
            .post(&self.load_url)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": query }));

        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn load_once(&self, query: &AggregationQuery) -> Result<Vec<UpstreamRow>, SourceError> {
        let response = self
            .load_request(query)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        tracing::debug!(
            "Aggregation /load answered HTTP {} ({} bytes)",
            status,
            body.len()
        );

        parse_load_body(status, &body)
    }
}

#[async_trait]
impl AggregationSource for HttpAggregationSource {
    async fn load(&self, query: &AggregationQuery) -> Result<Vec<UpstreamRow>, SourceError> {
        poll_until_ready(self.timeout, CONTINUE_WAIT_DELAY, || self.load_once(query)).await
    }
}

/// Repeat `attempt` while the service reports the result as pending.
/// Gives up with a transport error once `timeout` has passed.
async fn poll_until_ready<F, Fut>(
    timeout: Duration,
    delay: Duration,
    mut attempt: F,
) -> Result<Vec<UpstreamRow>, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<UpstreamRow>, SourceError>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match attempt().await {
            Err(SourceError::Pending) => {
                if tokio::time::Instant::now() + delay >= deadline {
                    return Err(SourceError::Network(format!(
                        "no result after {} attempts within {}s",
                        attempts,
                        timeout.as_secs()
                    )));
                }
                tracing::debug!("Aggregation query still running (attempt {})", attempts);
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoadResponse {
    #[serde(default)]
    data: Option<Vec<UpstreamRow>>,
    #[serde(default)]
    error: Option<String>,
}

/// Interpret a `/load` answer. An explicit `error` payload wins over the
/// HTTP status, so service-side failures stay application errors.
pub fn parse_load_body(status: u16, body: &str) -> Result<Vec<UpstreamRow>, SourceError> {
    let success = (200..300).contains(&status);

    match serde_json::from_str::<LoadResponse>(body) {
        Ok(LoadResponse {
            error: Some(message),
            ..
        }) if message == CONTINUE_WAIT => Err(SourceError::Pending),
        Ok(LoadResponse {
            error: Some(message),
            ..
        }) => Err(SourceError::Upstream(message)),
        Ok(_) if !success => Err(SourceError::Http {
            status,
            body: preview(body),
        }),
        Ok(LoadResponse { data: Some(rows), .. }) => Ok(rows),
        Ok(_) => Err(SourceError::Decode("response has neither data nor error".into())),
        Err(_) if !success => Err(SourceError::Http {
            status,
            body: preview(body),
        }),
        Err(e) => Err(SourceError::Decode(e.to_string())),
    }
}

fn preview(body: &str) -> String {
    let preview: String = body.chars().take(500).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d404_group_drilldown::query::QueryBuilder;
    use crate::shared::config::default_config;
    use contracts::dashboards::d404_group_drilldown::AmbientFilters;

    #[test]
    fn test_parse_data() {
        let rows = parse_load_body(
            200,
            r#"{"data": [{"Sales.customerGroup": "GrupoA", "Sales.amount": "10000"}]}"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Sales.customerGroup"], "GrupoA");
    }

    #[test]
    fn test_parse_error_payload_is_application() {
        let err = parse_load_body(400, r#"{"error": "Unknown member: Sales.foo"}"#).unwrap_err();
        assert!(matches!(err, SourceError::Upstream(ref m) if m.contains("Sales.foo")));
        assert_eq!(err.kind(), ErrorKind::Application);

        // Same payload with 200 is still an application error
        let err = parse_load_body(200, r#"{"error": "Query timeout"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Application);
    }

    #[test]
    fn test_parse_transport_failures() {
        let err = parse_load_body(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, SourceError::Http { status: 502, .. }));
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err = parse_load_body(200, "not json").unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));

        let err = parse_load_body(200, "{}").unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(2000);
        match parse_load_body(500, &body).unwrap_err() {
            SourceError::Http { body, .. } => assert_eq!(body.len(), 503),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_continue_wait_is_pending() {
        let err = parse_load_body(200, r#"{"error":"Continue wait"}"#).unwrap_err();
        assert!(matches!(err, SourceError::Pending));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_pending_result_is_polled_until_ready() {
        let mut calls = 0;
        let result = poll_until_ready(Duration::from_secs(5), Duration::from_millis(1), || {
            calls += 1;
            let call = calls;
            async move {
                if call < 3 {
                    Err(SourceError::Pending)
                } else {
                    parse_load_body(200, r#"{"data": [{"Sales.amount": "1"}]}"#)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_pending_past_timeout_is_transport() {
        let mut calls = 0;
        let err = poll_until_ready(Duration::from_millis(50), Duration::from_millis(10), || {
            calls += 1;
            async { Err(SourceError::Pending) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, SourceError::Network(ref m) if m.contains("no result")));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(calls > 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_polled() {
        let mut calls = 0;
        let err = poll_until_ready(Duration::from_secs(5), Duration::from_millis(1), || {
            calls += 1;
            async { Err(SourceError::Upstream("Unknown member".into())) }
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Application);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_token_is_sent_as_bearer() {
        let mut config = default_config().unwrap();
        let builder = QueryBuilder::new(&config.members, &config.levels, 10);
        let query = builder.root(&AmbientFilters::default(), false);

        let anonymous = HttpAggregationSource::new(&config.aggregation).unwrap();
        let request = anonymous.load_request(&query).build().unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());

        config.aggregation.api_token = Some("secret".into());
        let source = HttpAggregationSource::new(&config.aggregation).unwrap();
        let request = source.load_request(&query).build().unwrap();
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            "Bearer secret"
        );
        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:4000/cubejs-api/v1/load"
        );
    }
}
