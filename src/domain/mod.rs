//! Domain layer: the classification tree and its mindmap serialization
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod document;
pub mod error;
pub mod naming;
pub mod serializer;
pub mod style;
pub mod tree;

pub use document::{assemble, DocumentTemplate};
pub use error::{DomainError, DomainResult};
pub use naming::file_stem;
pub use serializer::{RenderConfig, SideSwitch, TreeSerializer, ROOT_TAG, SIDE_SWITCH_DIRECTIVE};
pub use style::{is_date_shaped, StyleRule, StyleTable, EPOCH_SENTINEL};
pub use tree::{TreeNode, DATE_KEY};
