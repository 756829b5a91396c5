//! Fraud-check proxy
//!
//! Forwards transaction attributes to the external classification service
//! and maps the response into a [`FraudVerdict`]. Detection itself lives
//! out of process; this crate only forwards a request and shapes the
//! answer. A failed check never fails transaction creation: callers go
//! through [`classify_or_default`], which degrades to the safe verdict.

pub mod error;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use spendguard_core::FraudVerdict;

pub use error::FraudError;

/// The attributes forwarded to the classifier
#[derive(Debug, Clone, Serialize)]
pub struct TransactionAttributes {
    pub amount: f64,
    pub location: String,
    /// When the transaction occurred; sent as epoch milliseconds
    pub time: DateTime<Utc>,
    pub description: String,
}

impl TransactionAttributes {
    pub fn time_millis(&self) -> i64 {
        self.time.timestamp_millis()
    }
}

/// Capability interface for fraud classification
///
/// One concrete HTTP implementation exists; tests substitute fakes
/// returning deterministic verdicts or simulated failures.
#[async_trait]
pub trait FraudClassifier: Send + Sync {
    async fn classify(&self, attributes: &TransactionAttributes)
        -> Result<FraudVerdict, FraudError>;
}

// ==================== Wire Contract ====================

/// Request body for the service's `/predict` endpoint
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    amount: f64,
    location: &'a str,
    /// Epoch milliseconds
    time: i64,
    description: &'a str,
}

/// Response body from `/predict`
#[derive(Debug, Deserialize)]
struct PredictResponse {
    fraud: bool,
    confidence: Option<f64>,
    #[serde(default)]
    description_analysis: serde_json::Value,
}

/// Lift the ordered reason strings out of the description analysis
fn extract_reasons(analysis: &serde_json::Value) -> Vec<String> {
    analysis
        .get("reasons")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn verdict_from_response(body: PredictResponse) -> FraudVerdict {
    let reasons = extract_reasons(&body.description_analysis);
    // The service may omit confidence; it historically means "about half sure"
    let confidence = body.confidence.unwrap_or(0.5);
    FraudVerdict::new(body.fraud, confidence, body.description_analysis, reasons)
}

// ==================== HTTP Implementation ====================

/// HTTP client for the external classification service
pub struct HttpFraudClassifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFraudClassifier {
    /// Build a classifier targeting `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FraudError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FraudClassifier for HttpFraudClassifier {
    async fn classify(
        &self,
        attributes: &TransactionAttributes,
    ) -> Result<FraudVerdict, FraudError> {
        let url = format!("{}/predict", self.base_url);
        let request = PredictRequest {
            amount: attributes.amount,
            location: &attributes.location,
            time: attributes.time_millis(),
            description: &attributes.description,
        };

        log::debug!(
            target: "spendguard::fraud",
            "Classifying transaction: amount={}, location={}",
            attributes.amount,
            attributes.location
        );

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(FraudError::Status {
                status: response.status().as_u16(),
            });
        }

        let body: PredictResponse =
            response
                .json()
                .await
                .map_err(|e| FraudError::InvalidResponse {
                    message: e.to_string(),
                })?;

        Ok(verdict_from_response(body))
    }
}

/// Run the classifier, absorbing any failure into the default safe verdict.
///
/// This is the seam that guarantees transaction creation never fails
/// because the classifier is unreachable: the error is logged, the caller
/// gets `{isFraud: false, confidence: 0}` and persists as usual. No retry.
pub async fn classify_or_default(
    classifier: &dyn FraudClassifier,
    attributes: &TransactionAttributes,
) -> FraudVerdict {
    match classifier.classify(attributes).await {
        Ok(verdict) => verdict,
        Err(e) => {
            log::warn!(
                target: "spendguard::fraud",
                "Fraud check failed, storing default verdict: {}",
                e
            );
            FraudVerdict::safe_default()
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    /// Fake classifier returning a fixed verdict
    struct StaticClassifier {
        verdict: FraudVerdict,
    }

    #[async_trait]
    impl FraudClassifier for StaticClassifier {
        async fn classify(
            &self,
            _attributes: &TransactionAttributes,
        ) -> Result<FraudVerdict, FraudError> {
            Ok(self.verdict.clone())
        }
    }

    /// Fake classifier simulating an unreachable service
    struct FailingClassifier;

    #[async_trait]
    impl FraudClassifier for FailingClassifier {
        async fn classify(
            &self,
            _attributes: &TransactionAttributes,
        ) -> Result<FraudVerdict, FraudError> {
            Err(FraudError::Status { status: 503 })
        }
    }

    fn attributes() -> TransactionAttributes {
        TransactionAttributes {
            amount: 500.0,
            location: "X".to_string(),
            time: Utc::now(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_classify_or_default_passes_verdict_through() {
        let classifier = StaticClassifier {
            verdict: FraudVerdict::new(true, 0.92, serde_json::json!({}), vec![]),
        };
        let verdict = classify_or_default(&classifier, &attributes()).await;
        assert!(verdict.is_fraud);
        assert_eq!(verdict.confidence, 0.92);
    }

    #[tokio::test]
    async fn test_classify_or_default_absorbs_failure() {
        let verdict = classify_or_default(&FailingClassifier, &attributes()).await;
        assert!(!verdict.is_fraud);
        assert_eq!(verdict.confidence, 0.0);
        assert!(verdict.reasons.is_empty());
        assert_eq!(verdict.description_analysis, serde_json::json!({}));
    }

    #[test]
    fn test_verdict_from_response_defaults_confidence() {
        let body: PredictResponse = serde_json::from_str(r#"{"fraud": true}"#).unwrap();
        let verdict = verdict_from_response(body);
        assert!(verdict.is_fraud);
        assert_eq!(verdict.confidence, 0.5);
    }

    #[test]
    fn test_verdict_from_response_lifts_reasons() {
        let body: PredictResponse = serde_json::from_str(
            r#"{
                "fraud": true,
                "confidence": 0.85,
                "description_analysis": {
                    "risk_score": 0.7,
                    "reasons": ["suspicious keyword: lottery", "late night transaction"]
                }
            }"#,
        )
        .unwrap();
        let verdict = verdict_from_response(body);
        assert_eq!(verdict.reasons.len(), 2);
        assert_eq!(verdict.reasons[0], "suspicious keyword: lottery");
        assert_eq!(verdict.confidence, 0.85);
    }

    #[test]
    fn test_verdict_from_response_clamps_confidence() {
        let body: PredictResponse =
            serde_json::from_str(r#"{"fraud": false, "confidence": 1.4}"#).unwrap();
        assert_eq!(verdict_from_response(body).confidence, 1.0);
    }

    #[test]
    fn test_extract_reasons_tolerates_shapes() {
        assert!(extract_reasons(&serde_json::json!({})).is_empty());
        assert!(extract_reasons(&serde_json::json!({"reasons": "not a list"})).is_empty());
        assert_eq!(
            extract_reasons(&serde_json::json!({"reasons": ["a", 1, "b"]})),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_time_is_sent_as_epoch_millis() {
        use chrono::TimeZone;
        let attrs = TransactionAttributes {
            amount: 1.0,
            location: "X".to_string(),
            time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            description: String::new(),
        };
        assert_eq!(attrs.time_millis(), 1_767_225_600_000);
    }
}
