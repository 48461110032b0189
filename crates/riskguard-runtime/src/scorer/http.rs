//! HTTP client for the external scoring model

use super::{ModelClient, ModelError, ModelPrediction};
use riskguard_core::{FeatureContribution, FeatureVector};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct ScoreRequest<'a> {
    features: &'a FeatureVector,
}

#[derive(Deserialize)]
struct ScoreResponse {
    fraud_score: f64,
    #[serde(default)]
    top_features: Vec<FeatureContribution>,
}

/// Calls `POST {base_url}/api/v1/score`
#[derive(Debug, Clone)]
pub struct HttpModelClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpModelClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: format!("{}/api/v1/score", base_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ModelClient for HttpModelClient {
    async fn predict(&self, features: &FeatureVector) -> Result<ModelPrediction, ModelError> {
        tracing::debug!("Calling scoring model: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ScoreRequest { features })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout
                } else {
                    ModelError::Transport(format!("HTTP request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(ModelError::Status(response.status().as_u16()));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("Failed to parse JSON: {}", e)))?;

        if !body.fraud_score.is_finite() {
            return Err(ModelError::InvalidResponse(format!(
                "non-finite fraud score: {}",
                body.fraud_score
            )));
        }

        Ok(ModelPrediction {
            fraud_score: body.fraud_score,
            top_features: body.top_features,
        })
    }
}
