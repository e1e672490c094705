//! Prism - Analytics backend client
//!
//! Plain request/response calls to the external analytics service. Each
//! call is a single `POST`; there are no retries and no timeout beyond the
//! client default.
//!
//! | Action    | Endpoint                    | Body                              | Field      |
//! |-----------|-----------------------------|-----------------------------------|------------|
//! | Chat      | `POST /api/chat`            | `{dataset_id, question}`          | `answer`   |
//! | Visualize | `POST /api/visualize`       | `{dataset_id, chart_type, x, y}`  | `spec`     |
//! | Report    | `POST /api/report/{id}`     | none                              | `markdown` |

use std::fmt;
use std::str::FromStr;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::PrismError;

/// Chart kinds offered by the chart builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Point,
    Area,
}

impl ChartType {
    pub fn next(self) -> Self {
        match self {
            ChartType::Bar => ChartType::Line,
            ChartType::Line => ChartType::Point,
            ChartType::Point => ChartType::Area,
            ChartType::Area => ChartType::Bar,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Point => "point",
            ChartType::Area => "area",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::Line => "Line",
            ChartType::Point => "Scatter",
            ChartType::Area => "Area",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "point" | "scatter" => Ok(ChartType::Point),
            "area" => Ok(ChartType::Area),
            other => Err(format!("unknown chart type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub dataset_id: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizeRequest {
    pub dataset_id: String,
    pub chart_type: ChartType,
    pub x: String,
    pub y: String,
}

/// Client for the analytics backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self, PrismError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PrismError::Network(format!("Invalid backend URL {}: {}", base_url, e)))?;
        let client = Client::builder()
            .user_agent(concat!("prism/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Ask a question about a dataset; returns the `answer` text.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String, PrismError> {
        let body = self.post(&["api", "chat"], Some(request)).await?;
        match body.get("answer") {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(value) if !is_falsy(value) => Ok(value.to_string()),
            _ => Err(PrismError::Shape("answer")),
        }
    }

    /// Request a chart spec; returns the `spec` object verbatim.
    pub async fn visualize(&self, request: &VisualizeRequest) -> Result<Value, PrismError> {
        let body = self.post(&["api", "visualize"], Some(request)).await?;
        match body {
            Value::Object(mut obj) => match obj.remove("spec") {
                Some(Value::Null) | None => Err(PrismError::Shape("spec")),
                Some(spec) => Ok(spec),
            },
            _ => Err(PrismError::Shape("spec")),
        }
    }

    /// Generate a report for a dataset; returns its `markdown`.
    pub async fn report(&self, dataset_id: &str) -> Result<String, PrismError> {
        let body = self
            .post::<()>(&["api", "report", dataset_id], None)
            .await?;
        match body.get("markdown") {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(PrismError::Shape("markdown")),
        }
    }

    /// Resolve path segments against the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PrismError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PrismError::Network(format!("Backend URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<B: Serialize>(&self, segments: &[&str], body: Option<&B>) -> Result<Value, PrismError> {
        let url = self.endpoint(segments)?;
        debug!("POST {}", url);

        let mut request = self.client.post(url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            PrismError::Network(format!("Request failed: {}", e))
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!("{} returned {}", url, status);
            return Err(PrismError::Network(format!("Backend returned {}", status)));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| PrismError::Network(format!("Invalid response body: {}", e)))
    }
}

/// Values that count as an absent answer: null, false, zero, NaN and "".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |v| v == 0.0 || v.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_backend;

    #[test]
    fn test_chart_type_round_trip_names() {
        assert_eq!("scatter".parse::<ChartType>(), Ok(ChartType::Point));
        assert_eq!(ChartType::Area.next(), ChartType::Bar);
        assert_eq!(
            serde_json::to_value(ChartType::Point).ok(),
            Some(serde_json::json!("point"))
        );
        assert!("pie".parse::<ChartType>().is_err());
    }

    #[test]
    fn test_endpoint_encodes_dataset_id() -> Result<(), PrismError> {
        let client = BackendClient::new("http://localhost:8000/base/")?;
        let url = client.endpoint(&["api", "report", "sales q1/2024"])?;
        assert_eq!(url.as_str(), "http://localhost:8000/base/api/report/sales%20q1%2F2024");
        Ok(())
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(BackendClient::new("not a url"), Err(PrismError::Network(_))));
    }

    #[tokio::test]
    async fn test_chat_answer() -> Result<(), PrismError> {
        let base = spawn_backend().await;
        let client = BackendClient::new(&base)?;
        let answer = client
            .chat(&ChatRequest {
                dataset_id: "ds1".into(),
                question: "top categories?".into(),
            })
            .await?;
        assert_eq!(answer, "ds1: top categories?");
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_missing_answer_is_shape_error() -> Result<(), PrismError> {
        let base = spawn_backend().await;
        let client = BackendClient::new(&base)?;
        let result = client
            .chat(&ChatRequest {
                dataset_id: "ds1".into(),
                question: "silent".into(),
            })
            .await;
        assert_eq!(result, Err(PrismError::Shape("answer")));
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_falsy_answer_is_shape_error() -> Result<(), PrismError> {
        let base = spawn_backend().await;
        let client = BackendClient::new(&base)?;
        for question in ["zero", "false", "blank"] {
            let result = client
                .chat(&ChatRequest {
                    dataset_id: "ds1".into(),
                    question: question.into(),
                })
                .await;
            assert_eq!(result, Err(PrismError::Shape("answer")), "{question}");
        }

        let count = client
            .chat(&ChatRequest {
                dataset_id: "ds1".into(),
                question: "count".into(),
            })
            .await?;
        assert_eq!(count, "42");
        Ok(())
    }

    #[test]
    fn test_is_falsy() {
        use serde_json::json;
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(is_falsy(&v), "{v}");
        }
        for v in [json!(true), json!(-1), json!("0"), json!([]), json!({})] {
            assert!(!is_falsy(&v), "{v}");
        }
    }

    #[tokio::test]
    async fn test_visualize_returns_spec() -> Result<(), PrismError> {
        let base = spawn_backend().await;
        let client = BackendClient::new(&base)?;
        let spec = client
            .visualize(&VisualizeRequest {
                dataset_id: "ds1".into(),
                chart_type: ChartType::Line,
                x: "month".into(),
                y: "revenue".into(),
            })
            .await?;
        assert_eq!(spec["mark"], "line");
        assert_eq!(spec["encoding"]["x"]["field"], "month");
        Ok(())
    }

    #[tokio::test]
    async fn test_report_markdown_and_status_errors() -> Result<(), PrismError> {
        let base = spawn_backend().await;
        let client = BackendClient::new(&base)?;
        assert_eq!(client.report("ds1").await?, "# Report for ds1");

        let err = client.report("missing").await.unwrap_err();
        assert!(matches!(err, PrismError::Network(ref m) if m.contains("404")));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() -> Result<(), PrismError> {
        // Port 9 (discard) on localhost is closed in test environments
        let client = BackendClient::new("http://127.0.0.1:9")?;
        let err = client.report("ds1").await.unwrap_err();
        assert!(matches!(err, PrismError::Network(_)));
        Ok(())
    }
}
