//! API client for communicating with the AIMS API

use aims_lib::{
    FieldError, LivenessResponse, MaintenanceAdvice, PredictionResponse, ReadinessResponse,
};
use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Error body returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
    #[serde(default)]
    pub fields: Option<Vec<FieldError>>,
}

/// Non-success responses from the API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid sensor reading: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },
}

/// API client for the AIMS API
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to reach API at {}", self.base_url))?;

        Self::parse(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach API at {}", self.base_url))?;

        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.context("Failed to parse response");
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ErrorResponse> = serde_json::from_str(&body).ok();

        let err = match parsed {
            Some(ErrorResponse {
                fields: Some(fields),
                ..
            }) if status == StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(fields),
            Some(e) => ApiError::Status {
                status: status.as_u16(),
                message: e.error,
            },
            None => ApiError::Status {
                status: status.as_u16(),
                message: body,
            },
        };
        Err(err.into())
    }

    pub async fn predict<B: Serialize>(&self, reading: &B) -> Result<PredictionResponse> {
        self.post("predict", reading).await
    }

    pub async fn liveness(&self) -> Result<LivenessResponse> {
        self.get("healthz").await
    }

    /// Readiness; a 503 still carries the readiness body
    pub async fn readiness(&self) -> Result<ReadinessResponse> {
        let url = self.base_url.join("readyz").context("Invalid path")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to reach API at {}", self.base_url))?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return response.json().await.context("Failed to parse response");
        }
        Self::parse(response).await
    }

    pub async fn faults(&self) -> Result<Vec<MaintenanceAdvice>> {
        self.get("faults").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aims_lib::{DemoScenario, FieldErrorKind};
    use serde_json::json;

    #[tokio::test]
    async fn test_predict_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "prediction_label": "Normal",
                    "probabilities": {"Normal": 0.97, "Bearing Wear": 0.03},
                    "shap_values": {"Oil_Temp": -0.4}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let response = client.predict(&DemoScenario::Normal.reading()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.prediction_label, "Normal");
        assert_eq!(response.confidence(), 0.97);
    }

    #[tokio::test]
    async fn test_predict_validation_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(422)
            .with_body(
                json!({
                    "error": "Validation failed",
                    "status": 422,
                    "fields": [
                        {"field": "Oil_Temp", "kind": "missing", "message": "Field required"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.predict(&json!({})).await.unwrap_err();

        match err.downcast_ref::<ApiError>() {
            Some(ApiError::Validation(fields)) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "Oil_Temp");
                assert_eq!(fields[0].kind, FieldErrorKind::Missing);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(500)
            .with_body(json!({"error": "Model artifacts not loaded.", "status": 500}).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.predict(&json!({})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "API error (500): Model artifacts not loaded."
        );
    }

    #[tokio::test]
    async fn test_readiness_503_has_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/readyz")
            .with_status(503)
            .with_body(
                json!({
                    "ready": false,
                    "status": "unhealthy",
                    "reason": "artifacts: artifact not found",
                    "components": {}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let readiness = client.readiness().await.unwrap();
        assert!(!readiness.ready);
        assert_eq!(
            readiness.reason.as_deref(),
            Some("artifacts: artifact not found")
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
