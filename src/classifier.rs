//! Classifier adapter.
//!
//! The model artifact is a JSON dump of a binary gradient-boosted tree
//! ensemble. It is loaded once at startup, checked against the feature
//! schema, and then shared read-only behind the [`Classifier`] trait.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::models::BorrowerRecord;
use crate::schema::{feature_names, FEATURE_COUNT};

/// Default location of the model artifact, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "models/modelo_turing/modelo_tuned_lightgbm_kfold.json";

/// Scores a borrower. Implementations must be immutable after construction.
pub trait Classifier: Send + Sync {
    /// Probability of the positive class (default), in `[0, 1]`.
    fn predict_proba(&self, record: &BorrowerRecord) -> Result<f64, AppError>;
}

/// A node of a regression tree, stored in preorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        /// Index into the feature vector.
        feature: usize,
        threshold: f64,
        /// Taken when `value <= threshold`.
        left: usize,
        right: usize,
        /// Branch taken for missing (NaN) values.
        #[serde(default = "default_left")]
        default_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

fn default_left() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Raw margin contributed by this tree.
    fn score(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { leaf } => return *leaf,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let value = features[*feature];
                    let go_left = if value.is_nan() {
                        *default_left
                    } else {
                        value <= *threshold
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }

    /// Children must point forward, which rules out cycles.
    fn validate(&self, tree_idx: usize) -> Result<(), AppError> {
        if self.nodes.is_empty() {
            return Err(AppError::ModelLoad(format!("tree {} has no nodes", tree_idx)));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } = node
            {
                if *feature >= FEATURE_COUNT {
                    return Err(AppError::ModelLoad(format!(
                        "tree {} node {} splits on unknown feature {}",
                        tree_idx, idx, feature
                    )));
                }
                if !threshold.is_finite() {
                    return Err(AppError::ModelLoad(format!(
                        "tree {} node {} has a non-finite threshold",
                        tree_idx, idx
                    )));
                }
                for child in [*left, *right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(AppError::ModelLoad(format!(
                            "tree {} node {} has invalid child {}",
                            tree_idx, idx, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// On-disk model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Column names the model was trained on, in order.
    pub feature_names: Vec<String>,
    /// Raw-margin offset added before the sigmoid.
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl ModelArtifact {
    /// Checks the artifact against the feature schema and its own structure.
    pub fn validate(&self) -> Result<(), AppError> {
        let expected: Vec<&str> = feature_names().collect();
        let actual: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        if actual != expected {
            return Err(AppError::ModelLoad(format!(
                "feature names {:?} do not match expected order {:?}",
                actual, expected
            )));
        }
        if self.trees.is_empty() {
            return Err(AppError::ModelLoad("artifact contains no trees".to_string()));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(idx)?;
        }
        Ok(())
    }

    /// Sum of the base score and every tree's leaf value.
    ///
    /// Expects an artifact that passed [`ModelArtifact::validate`].
    pub fn raw_score(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.score(features)).sum::<f64>()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Tree-ensemble classifier loaded from a JSON artifact.
#[derive(Debug, Clone)]
pub struct TreeEnsembleClassifier {
    artifact: ModelArtifact,
    path: PathBuf,
    sha256: String,
}

impl TreeEnsembleClassifier {
    /// Loads and validates the artifact at `path`.
    ///
    /// Returns [`AppError::ModelNotFound`] when the file is absent so the
    /// caller can halt startup with the expected path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::ModelNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|e| {
            AppError::ModelLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        let sha256 = hex::encode(Sha256::digest(&bytes));

        let artifact: ModelArtifact = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::ModelLoad(format!("failed to parse {}: {}", path.display(), e))
        })?;
        artifact.validate()?;

        tracing::info!(
            "Loaded model {} ({} trees, sha256 {})",
            path.display(),
            artifact.trees.len(),
            sha256
        );

        Ok(Self {
            artifact,
            path: path.to_path_buf(),
            sha256,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex-encoded SHA-256 of the artifact bytes.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn tree_count(&self) -> usize {
        self.artifact.trees.len()
    }
}

impl Classifier for TreeEnsembleClassifier {
    fn predict_proba(&self, record: &BorrowerRecord) -> Result<f64, AppError> {
        let features = record.feature_vector();
        let probability = sigmoid(self.artifact.raw_score(&features));
        if !probability.is_finite() {
            return Err(AppError::Inference(format!(
                "model produced a non-finite probability for {:?}",
                features
            )));
        }
        Ok(probability.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn names() -> Vec<&'static str> {
        feature_names().collect()
    }

    /// One stump on credit_score and one on default_history.
    fn artifact_json() -> serde_json::Value {
        json!({
            "feature_names": names(),
            "base_score": -0.5,
            "trees": [
                { "nodes": [
                    { "feature": 3, "threshold": 500.0, "left": 1, "right": 2 },
                    { "leaf": 1.0 },
                    { "leaf": -1.0 }
                ]},
                { "nodes": [
                    { "feature": 7, "threshold": 0.5, "left": 1, "right": 2, "default_left": false },
                    { "leaf": 0.0 },
                    { "leaf": 2.0 }
                ]}
            ]
        })
    }

    fn write_artifact(value: &serde_json::Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(value.to_string().as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_artifact_is_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match TreeEnsembleClassifier::load(&path) {
            Err(AppError::ModelNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_scores_follow_splits() {
        let file = write_artifact(&artifact_json());
        let model = TreeEnsembleClassifier::load(file.path()).unwrap();
        assert_eq!(model.tree_count(), 2);

        // credit_score 600 -> -1.0, no default history -> 0.0, base -0.5
        let record = BorrowerRecord::default();
        let p = model.predict_proba(&record).unwrap();
        assert!((p - sigmoid(-1.5)).abs() < 1e-12);

        let risky = BorrowerRecord {
            credit_score: 300,
            default_history: 1,
            ..BorrowerRecord::default()
        };
        let p = model.predict_proba(&risky).unwrap();
        assert!((p - sigmoid(2.5)).abs() < 1e-12);
    }

    #[test]
    fn test_nan_follows_default_branch() {
        let artifact: ModelArtifact = serde_json::from_value(artifact_json()).unwrap();
        let mut features = BorrowerRecord::default().feature_vector();
        features[3] = f64::NAN;
        features[7] = f64::NAN;
        // tree 0 defaults left (1.0), tree 1 defaults right (2.0)
        assert_eq!(artifact.raw_score(&features), -0.5 + 1.0 + 2.0);
    }

    #[test]
    fn test_rejects_mismatched_feature_names() {
        let mut value = artifact_json();
        value["feature_names"] = json!(["income", "age"]);
        let file = write_artifact(&value);
        let err = TreeEnsembleClassifier::load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelLoad(ref msg) if msg.contains("feature names")));
    }

    #[test]
    fn test_rejects_backward_child() {
        let mut value = artifact_json();
        value["trees"][0]["nodes"][0]["right"] = json!(0);
        let artifact: ModelArtifact = serde_json::from_value(value).unwrap();
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x04not json").unwrap();
        let err = TreeEnsembleClassifier::load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelLoad(_)));
    }

    #[test]
    fn test_checksum_is_sha256_of_bytes() {
        let value = artifact_json();
        let file = write_artifact(&value);
        let model = TreeEnsembleClassifier::load(file.path()).unwrap();
        let expected = hex::encode(Sha256::digest(value.to_string().as_bytes()));
        assert_eq!(model.sha256(), expected);
        assert_eq!(model.sha256().len(), 64);
    }
}
