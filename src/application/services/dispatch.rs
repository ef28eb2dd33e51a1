//! Render dispatch
//!
//! Submits a written document to PlantUML:
//! `java -jar <jar> -t<format> -o <image_dir> <document> -DPLANTUML_LIMIT_SIZE=<n>`.
//! PlantUML resolves `-o` relative to the document's directory.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::RendererConfig;
use crate::infrastructure::traits::CommandRunner;
use crate::infrastructure::InfraError;

/// One-way submission of documents to the external renderer.
pub struct RenderDispatch {
    cmd: Arc<dyn CommandRunner>,
    renderer: RendererConfig,
}

impl RenderDispatch {
    pub fn new(cmd: Arc<dyn CommandRunner>, renderer: RendererConfig) -> Self {
        Self { cmd, renderer }
    }

    /// Arguments passed to the renderer command for `document`.
    pub fn arguments(&self, document: &Path) -> Vec<String> {
        vec![
            "-jar".to_string(),
            self.renderer.jar.to_string_lossy().into_owned(),
            format!("-t{}", self.renderer.format),
            "-o".to_string(),
            self.renderer.image_dir.clone(),
            document.to_string_lossy().into_owned(),
            format!("-DPLANTUML_LIMIT_SIZE={}", self.renderer.limit_size),
        ]
    }

    /// Run the renderer on `document`.
    ///
    /// A failed spawn, a non-zero exit or any diagnostic output on stderr is
    /// an `ExternalTool` error. Nothing is retried.
    #[instrument(level = "debug", skip(self))]
    pub fn submit(&self, document: &Path) -> ApplicationResult<()> {
        let args = self.arguments(document);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!("submit: {} {}", self.renderer.command, args.join(" "));

        let output = self
            .cmd
            .run(&self.renderer.command, &arg_refs)
            .map_err(|e| {
                external_tool(
                    document,
                    format!("cannot run {}: {e}", self.renderer.command),
                    None,
                )
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let message = match stderr.trim() {
                "" => format!("{} exited with {}", self.renderer.command, output.status),
                diagnostic => diagnostic.to_string(),
            };
            return Err(external_tool(document, message, output.status.code()));
        }
        if !stderr.trim().is_empty() {
            return Err(external_tool(
                document,
                stderr.trim().to_string(),
                output.status.code(),
            ));
        }

        debug!(
            "submit: done {}: {}",
            document.display(),
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }
}

fn external_tool(document: &Path, message: String, exit_code: Option<i32>) -> ApplicationError {
    ApplicationError::ExternalTool {
        document: document.to_path_buf(),
        source: Box::new(InfraError::Renderer { message, exit_code }),
    }
}
