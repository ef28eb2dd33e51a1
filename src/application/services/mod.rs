//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner)
//! but are themselves concrete structs, not traits.

mod dispatch;
mod render;

pub use dispatch::RenderDispatch;
pub use render::{RenderJob, RenderService, RenderedView, RunOptions, RunReport, ViewOutcome};
