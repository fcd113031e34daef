//! Prediction service client.
//!
//! The prediction model is an external service reached with a single JSON
//! POST. Every non-success outcome (transport error, non-2xx status, a body
//! that does not match the response contract) is reported uniformly as
//! [`TelemetryError::Service`].

use crate::config::TelemetryConfig;
use crate::constants::{DEFAULT_CAR_TYPE, DEFAULT_TRACK_CONDITIONS, DEFAULT_WEATHER, USER_AGENT};
use crate::error::{Result, TelemetryError};
use crate::models::{PredictionRequest, PredictionResponse, RaceConditions, RaceDetails};
use crate::registry::IngestionRegistry;
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Anything that can turn a prediction request into a response
pub trait PredictionService {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> impl Future<Output = Result<PredictionResponse>> + Send;
}

impl PredictionRequest {
    /// Build the request body from the first practice and qualifying uploads.
    ///
    /// Fails with an eligibility error, before anything is sent, when the
    /// registry is not ready for a prediction round.
    pub fn from_registry(registry: &IngestionRegistry, conditions: &RaceConditions) -> Result<Self> {
        let uploads = registry.check_eligibility()?;

        Ok(Self {
            practice: uploads.practice.entries().unwrap_or_default().to_vec(),
            qualifying: uploads.qualifying.entries().unwrap_or_default().to_vec(),
            race_details: RaceDetails {
                race_name: conditions.race_name.clone(),
                date: Utc::now().to_rfc3339(),
                duration_hours: conditions.duration_hours,
            },
            track_conditions: non_blank_or(&conditions.track_conditions, DEFAULT_TRACK_CONDITIONS),
            weather: non_blank_or(&conditions.weather, DEFAULT_WEATHER),
            car_type: non_blank_or(&conditions.car_type, DEFAULT_CAR_TYPE),
        })
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// HTTP client for the prediction endpoint
#[derive(Debug, Clone)]
pub struct HttpPredictionService {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpPredictionService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TelemetryError::configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PredictionService for HttpPredictionService {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        debug!(
            endpoint = %self.endpoint,
            practice_entries = request.practice.len(),
            qualifying_entries = request.qualifying.len(),
            "Requesting prediction"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TelemetryError::service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelemetryError::service(format!("HTTP {status}: {body}")));
        }

        let prediction: PredictionResponse = response
            .json()
            .await
            .map_err(|e| TelemetryError::service(format!("unexpected response body: {e}")))?;

        info!(cars = prediction.predictions.len(), "Prediction received");
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, UploadedFile};
    use serde_json::json;

    fn registry() -> IngestionRegistry {
        let practice = json!({"CarNumber": "7", "LapTime": "1:35.2"}).as_object().unwrap().clone();
        let qualifying = json!({"CarNumber": "7", "QualPos": 1}).as_object().unwrap().clone();
        IngestionRegistry::new()
            .add(UploadedFile::decoded("fp1.json", Category::Practice, vec![practice], vec![]))
            .add(UploadedFile::decoded("fp2.json", Category::Practice, vec![], vec!["x".into()]))
            .add(UploadedFile::decoded("q.json", Category::Qualifying, vec![qualifying], vec![]))
    }

    #[test]
    fn test_request_uses_first_upload_of_each_category() {
        let request = PredictionRequest::from_registry(&registry(), &RaceConditions::default()).unwrap();

        assert_eq!(request.practice.len(), 1);
        assert_eq!(request.practice[0]["LapTime"], json!("1:35.2"));
        assert_eq!(request.qualifying[0]["QualPos"], json!(1));
        assert_eq!(request.race_details.race_name, "IMSA Event");
        assert_eq!(request.race_details.duration_hours, 6.0);
        assert_eq!(request.car_type, "all");
    }

    #[test]
    fn test_blank_conditions_fall_back() {
        let conditions = RaceConditions {
            track_conditions: "  ".into(),
            weather: String::new(),
            ..RaceConditions::default()
        };
        let request = PredictionRequest::from_registry(&registry(), &conditions).unwrap();
        assert_eq!(request.track_conditions, "Dry");
        assert_eq!(request.weather, "Sunny");
    }

    #[test]
    fn test_request_body_shape() {
        let request = PredictionRequest::from_registry(&registry(), &RaceConditions::default()).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        for key in ["practice", "qualifying", "race_details", "track_conditions", "weather", "car_type"] {
            assert!(body.get(key).is_some(), "missing {key}");
        }
        assert!(body["race_details"]["date"].is_string());
    }

    #[test]
    fn test_ineligible_registry_builds_no_request() {
        let registry = IngestionRegistry::new().add(UploadedFile::decoded(
            "practice.json",
            Category::Practice,
            vec![json!({"CarNumber": "7"}).as_object().unwrap().clone()],
            vec![],
        ));
        let result = PredictionRequest::from_registry(&registry, &RaceConditions::default());
        assert!(matches!(result, Err(TelemetryError::Eligibility { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_service_failure() {
        let service =
            HttpPredictionService::new("http://127.0.0.1:9/predict", Duration::from_secs(2)).unwrap();
        let request = PredictionRequest::from_registry(&registry(), &RaceConditions::default()).unwrap();
        let result = service.predict(&request).await;
        assert!(matches!(result, Err(TelemetryError::Service { .. })));
    }
}
