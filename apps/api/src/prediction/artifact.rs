//! Classifier artifact loading, the versioned node-record schema adapter,
//! and the read-through cache handed to request handlers.
//!
//! The artifact is an externally trained decision-tree ensemble serialized
//! as JSON: `format_version`, `n_features`, `classes`, and one or more
//! `trees`, each a `nodes` record array plus per-node `values` rows. The
//! file is read-only; loading never mutates it and is safe to repeat.
//!
//! Artifacts written by an older trainer carry node records without the
//! `missing_go_to_left` field. Loading reconciles them through an explicit
//! schema adapter: a new record is built in the current layout, every field
//! present in the old record is copied by name, and each newly required
//! field takes its declared neutral default. Any other structural mismatch
//! is surfaced as `ModelIncompatible`; a partially migrated artifact is
//! never served.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::prediction::tree::{self, NodeRecord, Tree};

/// One field of the current node-record schema. `migration_default` is the
/// neutral value filled in when an older record lacks the field; fields
/// without a default cannot be absent from any record.
struct SchemaField {
    name: &'static str,
    migration_default: Option<fn() -> Value>,
}

/// The node-record layout the current runtime requires (schema v2).
/// `missing_go_to_left` was added by a newer trainer; v1 records lack it.
const NODE_SCHEMA: &[SchemaField] = &[
    SchemaField { name: "left_child", migration_default: None },
    SchemaField { name: "right_child", migration_default: None },
    SchemaField { name: "feature", migration_default: None },
    SchemaField { name: "threshold", migration_default: None },
    SchemaField { name: "impurity", migration_default: None },
    SchemaField { name: "n_node_samples", migration_default: None },
    SchemaField { name: "weighted_n_node_samples", migration_default: None },
    SchemaField { name: "missing_go_to_left", migration_default: Some(|| Value::from(0)) },
];

/// Migrates raw node records to the current schema.
///
/// Returns the records in the current layout plus whether any record
/// actually needed migration. Every field present in a source record must
/// exist in the current schema and is copied unchanged; a source record
/// missing a field that has no migration default, an unexpected extra
/// field, or a non-record entry is a hard `ModelIncompatible`.
pub fn migrate_nodes(nodes: &[Value]) -> Result<(Vec<Map<String, Value>>, bool), AppError> {
    let mut migrated = Vec::with_capacity(nodes.len());
    let mut patched = false;

    for (i, raw) in nodes.iter().enumerate() {
        let record = raw.as_object().ok_or_else(|| {
            AppError::ModelIncompatible(format!("node {i} is not a record"))
        })?;

        for key in record.keys() {
            if !NODE_SCHEMA.iter().any(|f| f.name == key) {
                return Err(AppError::ModelIncompatible(format!(
                    "node {i} carries unknown field '{key}'"
                )));
            }
        }

        let mut rebuilt = Map::with_capacity(NODE_SCHEMA.len());
        for field in NODE_SCHEMA {
            match record.get(field.name) {
                Some(value) => {
                    rebuilt.insert(field.name.to_string(), value.clone());
                }
                None => match field.migration_default {
                    Some(default) => {
                        rebuilt.insert(field.name.to_string(), default());
                        patched = true;
                    }
                    None => {
                        return Err(AppError::ModelIncompatible(format!(
                            "node {i} is missing required field '{}'",
                            field.name
                        )));
                    }
                },
            }
        }

        migrated.push(rebuilt);
    }

    Ok((migrated, patched))
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    format_version: u32,
    n_features: usize,
    classes: Vec<i64>,
    trees: Vec<RawTree>,
}

#[derive(Debug, Deserialize)]
struct RawTree {
    nodes: Vec<Value>,
    values: Vec<Vec<f64>>,
}

/// A prediction for a single feature vector. The probability is the one
/// assigned to the predicted class, indexed by class, never the vector max.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub class_id: i64,
    pub probability: f64,
}

/// A loaded, reconciled classifier ensemble. Read-only after load.
#[derive(Debug)]
pub struct ClassifierArtifact {
    pub n_features: usize,
    pub classes: Vec<i64>,
    pub trees: Vec<Tree>,
    /// True when the node schema adapter had to migrate any record.
    pub patched: bool,
}

impl ClassifierArtifact {
    /// Runs the ensemble decision procedure on one encoded feature vector.
    pub fn predict(&self, features: &[f64]) -> Result<Prediction, AppError> {
        // The serving code always assembles the full quiz vector, so a
        // length mismatch means the artifact disagrees with the serving
        // contract, not that the client sent a bad request.
        if features.len() != self.n_features {
            return Err(AppError::ModelIncompatible(format!(
                "artifact expects {} features but the serving contract supplies {}",
                self.n_features,
                features.len()
            )));
        }

        let probs = tree::ensemble_probabilities(&self.trees, features, self.classes.len());
        let winner = tree::argmax(&probs);

        Ok(Prediction {
            class_id: self.classes[winner],
            probability: probs[winner],
        })
    }
}

fn decode(raw: RawArtifact, path: &Path) -> Result<ClassifierArtifact, AppError> {
    if raw.classes.is_empty() {
        return Err(AppError::ModelIncompatible("artifact declares no classes".into()));
    }
    if raw.trees.is_empty() {
        return Err(AppError::ModelIncompatible("artifact contains no trees".into()));
    }

    let mut patched = false;
    let mut trees = Vec::with_capacity(raw.trees.len());

    for (t, raw_tree) in raw.trees.into_iter().enumerate() {
        if raw_tree.values.len() != raw_tree.nodes.len() {
            return Err(AppError::ModelIncompatible(format!(
                "tree {t}: {} nodes but {} value rows",
                raw_tree.nodes.len(),
                raw_tree.values.len()
            )));
        }
        for (i, row) in raw_tree.values.iter().enumerate() {
            if row.len() != raw.classes.len() {
                return Err(AppError::ModelIncompatible(format!(
                    "tree {t}: value row {i} has {} entries for {} classes",
                    row.len(),
                    raw.classes.len()
                )));
            }
        }

        let (records, tree_patched) = migrate_nodes(&raw_tree.nodes)?;
        patched |= tree_patched;

        let nodes: Vec<NodeRecord> = records
            .into_iter()
            .map(|r| serde_json::from_value(Value::Object(r)))
            .collect::<Result<_, _>>()
            .map_err(|e| {
                AppError::ModelIncompatible(format!("tree {t}: node record decode failed: {e}"))
            })?;

        for (i, node) in nodes.iter().enumerate() {
            if node.left_child == tree::LEAF {
                continue;
            }
            if node.feature as usize >= raw.n_features {
                return Err(AppError::ModelIncompatible(format!(
                    "tree {t}: node {i} splits on feature {} but artifact declares {} features",
                    node.feature, raw.n_features
                )));
            }
            // Children must point forward into the node array; this also
            // rules out cycles, so traversal always terminates.
            for child in [node.left_child, node.right_child] {
                if child <= i as i64 || child as usize >= nodes.len() {
                    return Err(AppError::ModelIncompatible(format!(
                        "tree {t}: node {i} has child index {child} outside the forward range"
                    )));
                }
            }
        }

        trees.push(Tree { nodes, values: raw_tree.values });
    }

    if patched {
        warn!(
            path = %path.display(),
            format_version = raw.format_version,
            "artifact node schema migrated to the current layout"
        );
    }

    Ok(ClassifierArtifact {
        n_features: raw.n_features,
        classes: raw.classes,
        trees,
        patched,
    })
}

/// Loads and reconciles the artifact at `path`.
pub fn load(path: &Path) -> Result<ClassifierArtifact, AppError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::ModelUnavailable(format!("{}: {e}", path.display())))?;

    let raw: RawArtifact = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::ModelIncompatible(format!("artifact parse failed: {e}")))?;

    decode(raw, path)
}

/// Read-through cache for the loaded artifact.
///
/// Population is not exclusive: two first-requests may both load the file,
/// which is fine because loading is idempotent and side-effect-free on the
/// backing file. Whoever stores first wins; the loser's copy is dropped.
pub struct ModelStore {
    path: PathBuf,
    cached: RwLock<Option<Arc<ClassifierArtifact>>>,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Result<Arc<ClassifierArtifact>, AppError> {
        if let Some(artifact) = self.cached.read().expect("model cache poisoned").as_ref() {
            return Ok(Arc::clone(artifact));
        }

        let loaded = Arc::new(load(&self.path)?);
        info!(
            path = %self.path.display(),
            trees = loaded.trees.len(),
            classes = loaded.classes.len(),
            patched = loaded.patched,
            "classifier artifact loaded"
        );

        let mut slot = self.cached.write().expect("model cache poisoned");
        let stored = slot.get_or_insert_with(|| Arc::clone(&loaded));
        Ok(Arc::clone(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn v1_node(left: i64, right: i64, feature: i64, threshold: f64) -> Value {
        json!({
            "left_child": left,
            "right_child": right,
            "feature": feature,
            "threshold": threshold,
            "impurity": 0.5,
            "n_node_samples": 10,
            "weighted_n_node_samples": 10.0,
        })
    }

    fn v2_node(left: i64, right: i64, feature: i64, threshold: f64) -> Value {
        let mut v = v1_node(left, right, feature, threshold);
        v.as_object_mut()
            .unwrap()
            .insert("missing_go_to_left".into(), json!(0));
        v
    }

    #[test]
    fn test_migrates_v1_records_and_preserves_values() {
        let nodes = vec![v1_node(1, 2, 3, 0.25), v1_node(-1, -1, -2, -2.0)];
        let (migrated, patched) = migrate_nodes(&nodes).unwrap();

        assert!(patched);
        assert_eq!(migrated.len(), 2);
        for (original, rebuilt) in nodes.iter().zip(&migrated) {
            assert_eq!(rebuilt["missing_go_to_left"], json!(0));
            for (key, value) in original.as_object().unwrap() {
                assert_eq!(&rebuilt[key], value, "field {key} changed during migration");
            }
        }
    }

    #[test]
    fn test_v2_records_pass_through_unpatched() {
        let nodes = vec![v2_node(1, 2, 0, 0.5)];
        let (migrated, patched) = migrate_nodes(&nodes).unwrap();
        assert!(!patched);
        assert_eq!(Value::Object(migrated[0].clone()), nodes[0]);
    }

    #[test]
    fn test_missing_required_field_is_incompatible() {
        let mut node = v1_node(1, 2, 0, 0.5);
        node.as_object_mut().unwrap().remove("threshold");
        let err = migrate_nodes(&[node]).unwrap_err();
        assert!(
            matches!(&err, AppError::ModelIncompatible(msg) if msg.contains("threshold")),
            "got {err:?}"
        );
    }

    #[test]
    fn test_unknown_field_is_incompatible() {
        let mut node = v2_node(1, 2, 0, 0.5);
        node.as_object_mut()
            .unwrap()
            .insert("surprise".into(), json!(1));
        let err = migrate_nodes(&[node]).unwrap_err();
        assert!(matches!(&err, AppError::ModelIncompatible(msg) if msg.contains("surprise")));
    }

    #[test]
    fn test_non_record_node_is_incompatible() {
        let err = migrate_nodes(&[json!([1, 2, 3])]).unwrap_err();
        assert!(matches!(err, AppError::ModelIncompatible(_)));
    }

    fn stump_artifact(node_fn: fn(i64, i64, i64, f64) -> Value) -> Value {
        json!({
            "format_version": 2,
            "n_features": 2,
            "classes": [0, 1, 2],
            "trees": [{
                "nodes": [node_fn(1, 2, 0, 0.5), node_fn(-1, -1, -2, -2.0), node_fn(-1, -1, -2, -2.0)],
                "values": [[3.0, 3.0, 2.0], [3.0, 1.0, 0.0], [0.0, 2.0, 2.0]],
            }],
        })
    }

    fn write_artifact(value: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(value).unwrap().as_bytes())
            .unwrap();
        file
    }

    #[test]
    fn test_load_missing_file_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("dtmodel.json")).unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[test]
    fn test_load_garbage_is_model_incompatible() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json at all").unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelIncompatible(_)));
    }

    #[test]
    fn test_load_v1_artifact_marks_patched_and_predicts() {
        let file = write_artifact(&stump_artifact(v1_node));
        let artifact = load(file.path()).unwrap();

        assert!(artifact.patched);
        let prediction = artifact.predict(&[0.0, 0.0]).unwrap();
        assert_eq!(prediction.class_id, 0);
        assert!((prediction.probability - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_load_v2_artifact_is_unpatched() {
        let file = write_artifact(&stump_artifact(v2_node));
        let artifact = load(file.path()).unwrap();
        assert!(!artifact.patched);
    }

    #[test]
    fn test_value_row_class_mismatch_is_incompatible() {
        let mut doc = stump_artifact(v2_node);
        doc["trees"][0]["values"][1] = json!([1.0, 2.0]);
        let file = write_artifact(&doc);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelIncompatible(_)));
    }

    #[test]
    fn test_feature_out_of_range_is_incompatible() {
        let mut doc = stump_artifact(v2_node);
        doc["trees"][0]["nodes"][0]["feature"] = json!(7);
        let file = write_artifact(&doc);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelIncompatible(_)));
    }

    #[test]
    fn test_predict_probability_indexed_by_predicted_class() {
        // Right leaf ties classes 1 and 2 at 0.5 each; argmax takes the
        // lower index, and the returned probability is that class's entry.
        let file = write_artifact(&stump_artifact(v2_node));
        let artifact = load(file.path()).unwrap();
        let prediction = artifact.predict(&[1.0, 0.0]).unwrap();
        assert_eq!(prediction.class_id, 1);
        assert!((prediction.probability - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_predict_arity_mismatch_is_incompatible() {
        let file = write_artifact(&stump_artifact(v2_node));
        let artifact = load(file.path()).unwrap();
        assert!(matches!(
            artifact.predict(&[0.0]).unwrap_err(),
            AppError::ModelIncompatible(_)
        ));
    }

    #[test]
    fn test_out_of_bounds_child_is_incompatible() {
        // A child index past the end of the node array must fail at load
        // time, never reach traversal.
        let mut doc = stump_artifact(v2_node);
        doc["trees"][0]["nodes"][0]["left_child"] = json!(5);
        let file = write_artifact(&doc);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(&err, AppError::ModelIncompatible(msg) if msg.contains("child")));
    }

    #[test]
    fn test_backward_child_is_incompatible() {
        // Children must point forward; a backward edge would make the
        // traversal cycle.
        let mut doc = stump_artifact(v2_node);
        doc["trees"][0]["nodes"][1] = v2_node(0, 2, 0, 0.5);
        let file = write_artifact(&doc);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelIncompatible(_)));
    }

    #[test]
    fn test_negative_non_leaf_child_is_incompatible() {
        let mut doc = stump_artifact(v2_node);
        doc["trees"][0]["nodes"][0]["right_child"] = json!(-3);
        let file = write_artifact(&doc);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelIncompatible(_)));
    }

    #[test]
    fn test_store_caches_after_first_load() {
        let file = write_artifact(&stump_artifact(v2_node));
        let store = ModelStore::new(file.path());

        let first = store.get().unwrap();
        let second = store.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_store_surfaces_missing_file_per_request() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("dtmodel.json"));
        assert!(matches!(
            store.get().unwrap_err(),
            AppError::ModelUnavailable(_)
        ));
        // Still failing on the second request; nothing was cached.
        assert!(matches!(
            store.get().unwrap_err(),
            AppError::ModelUnavailable(_)
        ));
    }
}
