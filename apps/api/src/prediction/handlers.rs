use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::prediction::input::QuizSubmission;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub class_id: i64,
    pub probability: f64,
}

/// POST /predict
///
/// Validates the 19 answer fields, encodes the two categorical answers,
/// and runs the classifier on the assembled feature vector. Every failure
/// is terminal for the request; there are no retries between steps.
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<PredictResponse>, AppError> {
    let submission = QuizSubmission::from_value(&body)?;
    let features = submission.encode()?;

    let model = state.model.get()?;
    let prediction = model.predict(&features)?;

    if model.patched {
        // Open contract question: under a schema-migrated artifact the
        // predicted class and the max-probability class could drift apart,
        // and we still index the probability by the predicted class.
        warn!(
            class_id = prediction.class_id,
            probability = prediction.probability,
            "prediction served from a schema-migrated artifact"
        );
    }

    Ok(Json(PredictResponse {
        class_id: prediction.class_id,
        probability: prediction.probability,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::docs::DocumentStore;
    use crate::config::Config;
    use crate::prediction::artifact::ModelStore;
    use crate::sentiment::lexicon::LexiconSentiment;
    use serde_json::json;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;

    fn test_state(model_path: &Path) -> AppState {
        AppState {
            config: Config {
                google_api_key: None,
                model_path: model_path.display().to_string(),
                docs_path: "unused.pdf".to_string(),
                gemini_models: vec![],
                tts_command: "true".to_string(),
                port: 0,
                rust_log: "info".to_string(),
            },
            llm: None,
            model: Arc::new(ModelStore::new(model_path)),
            docs: Arc::new(DocumentStore::new("unused.pdf")),
            sentiment: Arc::new(LexiconSentiment),
        }
    }

    /// A 19-feature stump splitting on the question7 code at 3.0.
    fn write_test_artifact() -> tempfile::NamedTempFile {
        fn node(left: i64, right: i64, feature: i64, threshold: f64) -> Value {
            json!({
                "left_child": left, "right_child": right,
                "feature": feature, "threshold": threshold,
                "impurity": 0.4, "n_node_samples": 20,
                "weighted_n_node_samples": 20.0, "missing_go_to_left": 0,
            })
        }
        let doc = json!({
            "format_version": 2,
            "n_features": 19,
            "classes": [0, 1, 2],
            "trees": [{
                "nodes": [node(1, 2, 6, 3.0), node(-1, -1, -2, -2.0), node(-1, -1, -2, -2.0)],
                "values": [[8.0, 6.0, 6.0], [8.0, 2.0, 2.0], [0.0, 4.0, 4.0]],
            }],
        });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&doc).unwrap().as_bytes())
            .unwrap();
        file
    }

    fn example_body(q7: &str, q8: &str) -> Value {
        let mut obj = serde_json::Map::new();
        for i in 1..=19 {
            if i == 7 {
                obj.insert("question7".into(), json!(q7));
            } else if i == 8 {
                obj.insert("question8".into(), json!(q8));
            } else {
                obj.insert(format!("question{i}"), json!(0));
            }
        }
        Value::Object(obj)
    }

    #[tokio::test]
    async fn test_predict_end_to_end() {
        let artifact = write_test_artifact();
        let state = test_state(artifact.path());

        let body = example_body("Python", "Data Science");
        let Json(resp) = handle_predict(State(state), Json(body)).await.unwrap();

        // Python encodes to 6 > 3.0, landing in the right leaf [0,4,4];
        // the tie resolves to class 1 and we return that class's probability.
        assert_eq!(resp.class_id, 1);
        assert!((resp.probability - 0.5).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&resp.probability));
    }

    #[tokio::test]
    async fn test_predict_unknown_category_is_400_kind() {
        let artifact = write_test_artifact();
        let state = test_state(artifact.path());

        let body = example_body("Nonexistent", "Data Science");
        let err = handle_predict(State(state), Json(body)).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownCategory { .. }));
    }

    #[tokio::test]
    async fn test_predict_missing_artifact_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir.path().join("dtmodel.json"));

        let body = example_body("Python", "Data Science");
        let err = handle_predict(State(state), Json(body)).await.unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }
}
