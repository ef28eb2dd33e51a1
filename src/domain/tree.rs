//! Classification tree as loaded from JSON.
//!
//! Children keep the order of the source file, which is load-bearing for the
//! generated outline.

use indexmap::IndexMap;
use serde_json::Value;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::style::is_date_shaped;

/// Reserved key carrying the date a node was introduced.
pub const DATE_KEY: &str = "_date";

/// One node of the classification tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// Node without children.
    Leaf { date: Option<String> },
    /// Node with ordered, labeled children.
    Branch {
        children: IndexMap<String, TreeNode>,
        date: Option<String>,
    },
    /// Bare date string found where a subtree was expected.
    Date(String),
}

impl TreeNode {
    /// Convert a parsed JSON document into a tree.
    ///
    /// The `_date` key is lifted out of the children. A `_date` that is not a
    /// string is kept as its JSON text so styling reports it as malformed.
    pub fn from_json(value: &Value) -> DomainResult<Self> {
        Self::convert(value, "$")
    }

    fn convert(value: &Value, path: &str) -> DomainResult<Self> {
        match value {
            Value::Object(map) => {
                let mut date = None;
                let mut children = IndexMap::with_capacity(map.len());
                for (key, child) in map {
                    if key == DATE_KEY {
                        date = Some(match child {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        });
                        continue;
                    }
                    let child_path = format!("{path}.{key}");
                    children.insert(key.clone(), Self::convert(child, &child_path)?);
                }
                if children.is_empty() {
                    Ok(Self::Leaf { date })
                } else {
                    Ok(Self::Branch { children, date })
                }
            }
            Value::String(s) if is_date_shaped(s) => Ok(Self::Date(s.clone())),
            Value::Array(_) => Err(DomainError::InvalidTree {
                path: path.to_string(),
                message: "arrays are not allowed in the classification tree".to_string(),
            }),
            _ => Ok(Self::Leaf { date: None }),
        }
    }

    /// Date this node was introduced, if recorded.
    pub fn date(&self) -> Option<&str> {
        match self {
            Self::Leaf { date } | Self::Branch { date, .. } => date.as_deref(),
            Self::Date(_) => None,
        }
    }

    pub fn children(&self) -> Option<&IndexMap<String, TreeNode>> {
        match self {
            Self::Branch { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn has_children(&self) -> bool {
        self.children().is_some_and(|c| !c.is_empty())
    }

    /// Follow a path of labels from this node.
    pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Option<&TreeNode> {
        path.iter()
            .try_fold(self, |node, label| node.children()?.get(label.as_ref()))
    }

    /// Number of nodes below this one.
    pub fn node_count(&self) -> usize {
        self.children()
            .map(|c| c.values().map(|n| 1 + n.node_count()).sum())
            .unwrap_or(0)
    }

    /// Number of levels below this one (a leaf has depth 0).
    pub fn depth(&self) -> usize {
        self.children()
            .and_then(|c| c.values().map(|n| 1 + n.depth()).max())
            .unwrap_or(0)
    }
}
