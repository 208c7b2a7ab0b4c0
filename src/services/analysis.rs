// SPDX-License-Identifier: MIT

//! Completion-API client for audit analysis and report generation.
//!
//! Sends synthetic performance data to an OpenAI-compatible chat
//! completions endpoint and parses the structured JSON analysis it
//! returns. A second call renders the analysis as a prose report.
//!
//! Any transport error or unparseable response is a hard failure of the
//! parent audit; no fallback score is computed locally.

use crate::error::AppError;
use crate::models::{Platform, ReportFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const COMPLETION_MODEL: &str = "gpt-4o";

/// JSON shape the model is instructed to return.
const ANALYSIS_FORMAT: &str = r#"{
  "summary": "Brief overview of the account performance",
  "keyInsights": ["insight 1", "insight 2", "insight 3"],
  "recommendations": ["recommendation 1", "recommendation 2", "recommendation 3"],
  "performanceMetrics": [
    {"metric": "Metric name", "value": "Metric value", "status": "good|warning|poor"}
  ],
  "score": 85
}"#;

/// Structured result of analyzing one account's performance data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub performance_metrics: Vec<PerformanceMetric>,
    /// Account health score, clamped into [0, 100]
    pub score: f64,
}

/// One row of the performance metrics table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetric {
    pub metric: String,
    pub value: String,
    /// "good", "warning" or "poor"
    pub status: String,
}

enum Backend {
    /// Real calls against the configured completion endpoint.
    Live { api_key: String },
    /// No API key configured; every call fails the parent audit.
    Disabled,
    /// Canned responses for tests and offline demos.
    Mock,
    /// Every call errors, for exercising the failed-audit path.
    MockFailing,
}

/// Client for the external completion service.
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
    backend: Backend,
}

impl AnalysisClient {
    /// Create a live client, or a disabled one when no API key is set.
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        let backend = match api_key {
            Some(key) => Backend::Live { api_key: key },
            None => {
                tracing::warn!("No completion API key configured; audits will fail");
                Backend::Disabled
            }
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
            backend,
        }
    }

    /// Create a mock client that returns canned analysis results.
    pub fn new_mock() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: String::new(),
            backend: Backend::Mock,
        }
    }

    /// Create a mock client whose calls always fail.
    pub fn new_mock_failing() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: String::new(),
            backend: Backend::MockFailing,
        }
    }

    /// Analyze account performance data.
    pub async fn analyze(
        &self,
        platform: Platform,
        account_data: &Value,
    ) -> Result<AnalysisResult, AppError> {
        match &self.backend {
            Backend::Mock => return Ok(mock_analysis(platform)),
            Backend::MockFailing => {
                return Err(AppError::AnalysisFailed("mock analysis failure".to_string()))
            }
            Backend::Disabled => {
                return Err(AppError::AnalysisFailed(
                    "OPENAI_API_KEY not configured".to_string(),
                ))
            }
            Backend::Live { .. } => {}
        }

        let data = serde_json::to_string_pretty(account_data)
            .map_err(|e| AppError::AnalysisFailed(format!("Failed to encode data: {}", e)))?;

        let prompt = format!(
            "Please analyze the following advertising data from {platform} and provide a \
             comprehensive audit report.\n\n\
             Data to analyze:\n{data}\n\n\
             Please provide your analysis in the following JSON format:\n{ANALYSIS_FORMAT}\n\n\
             Focus on:\n\
             - Campaign performance and optimization opportunities\n\
             - Budget allocation and efficiency\n\
             - Audience targeting effectiveness\n\
             - Creative performance insights\n\
             - Overall account health score (0-100)"
        );

        let system = "You are an expert digital advertising analyst. Analyze the provided \
                      advertising data and provide actionable insights and recommendations. \
                      Always respond with valid JSON in the specified format.";

        let content = self
            .chat_completion(system, &prompt, true, 0.3)
            .await
            .map_err(|e| AppError::AnalysisFailed(e.to_string()))?;

        parse_analysis(&content)
    }

    /// Render a prose audit report from an analysis result.
    ///
    /// The report format is advisory text in the prompt only; no binary
    /// artifact is produced.
    pub async fn render_report(
        &self,
        analysis: &AnalysisResult,
        platform: Platform,
        account_name: &str,
        format: ReportFormat,
    ) -> Result<String, AppError> {
        match &self.backend {
            Backend::Mock => return Ok(mock_report(platform, account_name)),
            Backend::MockFailing => {
                return Err(AppError::ReportFailed("mock report failure".to_string()))
            }
            Backend::Disabled => {
                return Err(AppError::ReportFailed(
                    "OPENAI_API_KEY not configured".to_string(),
                ))
            }
            Backend::Live { .. } => {}
        }

        let results = serde_json::to_string_pretty(analysis)
            .map_err(|e| AppError::ReportFailed(format!("Failed to encode analysis: {}", e)))?;

        let prompt = format!(
            "Generate a professional advertising audit report in {format} format for the \
             {platform} account \"{account_name}\".\n\n\
             Analysis Results:\n{results}\n\n\
             Please format this as a comprehensive audit report suitable for {format}. Include:\n\
             - Executive Summary\n\
             - Key Performance Insights\n\
             - Detailed Recommendations\n\
             - Performance Metrics Analysis\n\
             - Action Plan\n\n\
             Keep the tone professional and actionable."
        );

        let system = format!(
            "You are a professional marketing consultant creating audit reports. \
             Generate a well-structured report in {format} format."
        );

        let content = self
            .chat_completion(&system, &prompt, false, 0.2)
            .await
            .map_err(|e| AppError::ReportFailed(e.to_string()))?;

        if content.trim().is_empty() {
            return Err(AppError::ReportFailed("Empty completion response".to_string()));
        }

        Ok(content)
    }

    /// Make one chat-completion call and return the message content.
    async fn chat_completion(
        &self,
        system: &str,
        user: &str,
        json_response: bool,
        temperature: f32,
    ) -> Result<String, AppError> {
        let api_key = match &self.backend {
            Backend::Live { api_key } => api_key,
            _ => unreachable!("chat_completion is only called on the live backend"),
        };

        let request = ChatRequest {
            model: COMPLETION_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: json_response.then(|| ResponseFormat {
                format_type: "json_object",
            }),
            temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::AnalysisFailed(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AnalysisFailed(format!("HTTP {}: {}", status, body)));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::AnalysisFailed(format!("JSON parse error: {}", e)))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

/// Normalize a raw completion payload into an [`AnalysisResult`].
///
/// Missing fields default to empty values; the score is clamped into
/// [0, 100] regardless of what the model returned. An unparseable body is
/// a hard error.
pub fn parse_analysis(content: &str) -> Result<AnalysisResult, AppError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| AppError::AnalysisFailed(format!("Unparseable analysis response: {}", e)))?;

    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);

    let performance_metrics = value
        .get("performanceMetrics")
        .cloned()
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .unwrap_or_default();

    Ok(AnalysisResult {
        summary: value
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("Analysis completed")
            .to_string(),
        key_insights: string_list(value.get("keyInsights")),
        recommendations: string_list(value.get("recommendations")),
        performance_metrics,
        score,
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn mock_analysis(platform: Platform) -> AnalysisResult {
    AnalysisResult {
        summary: format!(
            "{} account performance is solid with room for optimization.",
            platform.config().name
        ),
        key_insights: vec![
            "Search campaigns outperform display on conversion rate".to_string(),
            "Budget is concentrated in two campaigns".to_string(),
        ],
        recommendations: vec![
            "Shift budget toward the highest-converting campaign".to_string(),
            "Test new audience segments".to_string(),
        ],
        performance_metrics: vec![PerformanceMetric {
            metric: "CTR".to_string(),
            value: "2.1%".to_string(),
            status: "good".to_string(),
        }],
        score: 72.0,
    }
}

fn mock_report(platform: Platform, account_name: &str) -> String {
    format!(
        "Executive Summary\n\
         The {} account \"{}\" is performing within expected ranges.\n\n\
         Key Insights\n- Strong search performance\n\n\
         Recommendations\n- Rebalance budget allocation\n\n\
         Metrics\n- CTR: 2.1% (good)\n\n\
         Action Plan\n1. Review campaign budgets this week.",
        platform.config().name,
        account_name
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_score_defaults_to_zero() {
        let result = parse_analysis(r#"{"summary": "ok"}"#).unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.summary, "ok");
    }

    #[test]
    fn score_above_range_is_clamped_to_100() {
        let result = parse_analysis(r#"{"score": 150}"#).unwrap();
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn negative_score_is_clamped_to_zero() {
        let result = parse_analysis(r#"{"score": -20}"#).unwrap();
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let result = parse_analysis(r#"{"score": 50}"#).unwrap();
        assert_eq!(result.summary, "Analysis completed");
        assert!(result.key_insights.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(result.performance_metrics.is_empty());
    }

    #[test]
    fn full_payload_is_parsed() {
        let content = r#"{
            "summary": "Strong quarter",
            "keyInsights": ["a", "b"],
            "recommendations": ["c"],
            "performanceMetrics": [{"metric": "CPC", "value": "$1.14", "status": "warning"}],
            "score": 85
        }"#;
        let result = parse_analysis(content).unwrap();
        assert_eq!(result.key_insights, vec!["a", "b"]);
        assert_eq!(result.performance_metrics.len(), 1);
        assert_eq!(result.performance_metrics[0].status, "warning");
        assert_eq!(result.score, 85.0);
    }

    #[test]
    fn unparseable_body_is_a_hard_error() {
        assert!(matches!(
            parse_analysis("not json"),
            Err(AppError::AnalysisFailed(_))
        ));
    }

    #[test]
    fn malformed_metrics_fall_back_to_empty() {
        let result = parse_analysis(r#"{"performanceMetrics": "oops", "score": 10}"#).unwrap();
        assert!(result.performance_metrics.is_empty());
        assert_eq!(result.score, 10.0);
    }

    #[tokio::test]
    async fn disabled_client_fails_analysis() {
        let client = AnalysisClient::new(None, "https://api.openai.com/v1".to_string());
        let err = client
            .analyze(Platform::GoogleAds, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AnalysisFailed(_)));
    }

    #[tokio::test]
    async fn mock_client_returns_canned_result() {
        let client = AnalysisClient::new_mock();
        let result = client
            .analyze(Platform::FacebookAds, &serde_json::json!({}))
            .await
            .unwrap();
        assert!(result.score >= 0.0 && result.score <= 100.0);
        assert!(result.summary.contains("Facebook Ads"));
    }
}
