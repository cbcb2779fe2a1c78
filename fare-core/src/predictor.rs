//! Fare regression model.
//!
//! The shipped model is a gradient-boosted tree ensemble exported as an
//! XGBoost JSON dump. Prediction is `base_score` plus the leaf value reached
//! in every tree.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::{collections::HashMap, fmt::Debug, fs, path::Path};
use thiserror::Error;

use crate::features::{FEATURE_COUNT, FeatureVector};

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("tree {tree} references missing node {node}")]
    MissingNode { tree: usize, node: u32 },

    #[error("tree {tree} did not reach a leaf")]
    NoLeaf { tree: usize },

    #[error("model produced a non-finite fare ({0})")]
    NonFinite(f64),
}

pub trait FarePredictor: Send + Sync + Debug {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SplitFeature {
    Index(usize),
    Name(String),
}

impl SplitFeature {
    fn index(&self) -> Result<usize> {
        match self {
            SplitFeature::Index(i) => Ok(*i),
            SplitFeature::Name(name) => name
                .strip_prefix('f')
                .unwrap_or(name)
                .parse()
                .with_context(|| format!("Unsupported split feature name '{name}'")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNode {
    nodeid: u32,
    leaf: Option<f64>,
    split: Option<SplitFeature>,
    split_condition: Option<f64>,
    yes: Option<u32>,
    no: Option<u32>,
    missing: Option<u32>,
    #[serde(default)]
    children: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    #[serde(default = "default_base_score")]
    base_score: f64,
    num_features: usize,
    trees: Vec<RawNode>,
}

fn default_base_score() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(f64),
    Split { feature: usize, threshold: f64, yes: u32, no: u32, missing: u32 },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: HashMap<u32, Node>,
}

impl Tree {
    fn from_raw(root: RawNode, tree: usize) -> Result<Self> {
        let mut nodes = HashMap::new();
        let mut stack = vec![root];
        while let Some(raw) = stack.pop() {
            let node = match (raw.leaf, &raw.split) {
                (Some(value), _) => Node::Leaf(value),
                (None, Some(split)) => {
                    let feature = split.index()?;
                    if feature >= FEATURE_COUNT {
                        return Err(anyhow!(
                            "tree {tree} node {} splits on feature {feature}, model takes {FEATURE_COUNT}",
                            raw.nodeid
                        ));
                    }
                    let threshold = raw.split_condition.ok_or_else(|| {
                        anyhow!("tree {tree} node {} has no split_condition", raw.nodeid)
                    })?;
                    let (yes, no) = raw.yes.zip(raw.no).ok_or_else(|| {
                        anyhow!("tree {tree} node {} is missing yes/no children", raw.nodeid)
                    })?;
                    Node::Split { feature, threshold, yes, no, missing: raw.missing.unwrap_or(yes) }
                }
                (None, None) => {
                    return Err(anyhow!("tree {tree} node {} is neither leaf nor split", raw.nodeid));
                }
            };
            if nodes.insert(raw.nodeid, node).is_some() {
                return Err(anyhow!("tree {tree} has more than one node {}", raw.nodeid));
            }
            stack.extend(raw.children);
        }

        let tree_model = Self { nodes };
        tree_model.validate(tree)?;
        Ok(tree_model)
    }

    fn validate(&self, tree: usize) -> Result<()> {
        if self.node(0).is_none() {
            return Err(anyhow!("tree {tree} has no root node"));
        }
        for node in self.nodes.values() {
            if let Node::Split { yes, no, missing, .. } = node {
                for child in [yes, no, missing] {
                    if self.node(*child).is_none() {
                        return Err(anyhow!("tree {tree} references missing node {child}"));
                    }
                }
            }
        }
        Ok(())
    }

    fn node(&self, id: u32) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn leaf_value(&self, features: &[f64], tree: usize) -> Result<f64, ModelError> {
        let mut id = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            match self.node(id).ok_or(ModelError::MissingNode { tree, node: id })? {
                Node::Leaf(value) => return Ok(*value),
                Node::Split { feature, threshold, yes, no, missing } => {
                    let x = features[*feature];
                    id = if x.is_nan() {
                        *missing
                    } else if x < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
        Err(ModelError::NoLeaf { tree })
    }
}

/// Gradient-boosted regression trees.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    base_score: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawModel = serde_json::from_str(json).context("Failed to parse model JSON")?;

        if raw.num_features != FEATURE_COUNT {
            return Err(anyhow!(
                "Model was trained on {} features, the fare feature vector has {FEATURE_COUNT}",
                raw.num_features
            ));
        }
        if raw.trees.is_empty() {
            return Err(anyhow!("Model contains no trees"));
        }

        let trees = raw
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, root)| Tree::from_raw(root, i))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { base_score: raw.base_score, trees })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact: {}", path.display()))?;

        Self::from_json(&contents).with_context(|| format!("Invalid model artifact: {}", path.display()))
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl FarePredictor for TreeEnsemble {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let x = features.as_slice();
        let mut fare = self.base_score;
        for (i, tree) in self.trees.iter().enumerate() {
            fare += tree.leaf_value(x, i)?;
        }

        if fare.is_finite() { Ok(fare) } else { Err(ModelError::NonFinite(fare)) }
    }
}
