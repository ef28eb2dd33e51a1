//! Render a dated classification tree into a family of PlantUML mindmaps.
//!
//! Layers: `domain` (pure tree, style and document logic), `application`
//! (render orchestration over I/O traits), `infrastructure` (real I/O and
//! wiring), `cli` (arguments, execution, terminal output).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
