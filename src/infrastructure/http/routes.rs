//! Request handlers

use super::AppState;
use super::error::ApiError;
use crate::application::inference::parse_input_window;
use crate::domain::errors::InferenceError;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub input_data: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_trend: String,
    pub probabilities: BTreeMap<String, f64>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn predict(
    State(state): State<AppState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| InferenceError::InvalidInput {
        reason: rejection.body_text(),
    })?;
    let raw = query.input_data.ok_or_else(|| InferenceError::InvalidInput {
        reason: "missing query parameter 'input_data'".to_string(),
    })?;
    let window = parse_input_window(&raw)?;
    let prediction = state.service.predict(&window)?;

    Ok(Json(PredictResponse {
        timestamp: prediction.predicted_at.format(TIMESTAMP_FORMAT).to_string(),
        predicted_trend: prediction.predicted_trend,
        probabilities: prediction.probabilities,
    }))
}

pub async fn service_check() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Trend prediction service is running".to_string(),
    })
}

/// Liveness check
pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::inference::InferenceService;
    use crate::application::preprocessing::{LabelCodec, MinMaxScaler};
    use crate::domain::errors::ModelError;
    use crate::domain::ports::TrendClassifier;
    use axum::http::{StatusCode, Uri};
    use axum::response::IntoResponse;
    use ndarray::{Array1, ArrayView2, array};
    use std::sync::Arc;

    struct UpClassifier;

    impl TrendClassifier for UpClassifier {
        fn predict_proba(&self, _window: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
            Ok(array![0.25, 0.25, 0.5])
        }

        fn num_classes(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "up"
        }
    }

    fn state() -> AppState {
        let scaler = MinMaxScaler::fit(&[0.0, 50.0]).unwrap();
        let codec = LabelCodec::fit(["down", "stable", "up"]).unwrap();
        let service = InferenceService::new(Box::new(UpClassifier), scaler, codec, 3).unwrap();
        AppState::new(Arc::new(service))
    }

    fn query(input: Option<&str>) -> Result<Query<PredictQuery>, QueryRejection> {
        Ok(Query(PredictQuery {
            input_data: input.map(str::to_string),
        }))
    }

    #[tokio::test]
    async fn test_predict_handler_success() {
        let Json(body) = predict(State(state()), query(Some("20,21,23")))
            .await
            .unwrap();

        assert_eq!(body.predicted_trend, "up");
        assert_eq!(body.probabilities.len(), 3);
        assert_eq!(body.timestamp.len(), "2024-01-01 00:00:00".len());
    }

    #[tokio::test]
    async fn test_predict_handler_missing_input() {
        let err = predict(State(state()), query(None)).await.unwrap_err();
        assert!(err.message().contains("input_data"));
    }

    #[tokio::test]
    async fn test_predict_handler_wrong_length() {
        let err = predict(State(state()), query(Some("1,2"))).await.unwrap_err();
        assert!(err.message().contains("2 values"));
    }

    #[tokio::test]
    async fn test_predict_handler_unreadable_query_is_500() {
        let uri: Uri = "/predict?input_data=1,2,3&input_data=4,5,6".parse().unwrap();

        let err = predict(State(state()), Query::try_from_uri(&uri))
            .await
            .unwrap_err();

        assert!(err.message().contains("Invalid input"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_liveness_reports_version() {
        let Json(body) = liveness().await;
        assert_eq!(body["status"], "alive");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
