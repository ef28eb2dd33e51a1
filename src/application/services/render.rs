//! Mindmap render orchestration
//!
//! Loads the classification tree, plans the views, and for each view
//! serializes, writes and submits a document. Views are processed in
//! parallel; a failing view is reported without stopping the others.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, error, info, instrument, warn};

use crate::application::services::RenderDispatch;
use crate::application::snippets::figure_snippet;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::serializer::UNBOUNDED_DEPTH;
use crate::domain::{
    file_stem, DocumentTemplate, RenderConfig, SideSwitch, StyleTable, TreeNode, TreeSerializer,
};
use crate::infrastructure::traits::FileSystem;

/// File receiving the LaTeX figure snippets.
pub const SNIPPETS_FILE: &str = "figures.tex";

/// Per-run switches coming from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Keep intermediate documents after rendering
    pub keep_intermediate: bool,
    /// Write LaTeX figure snippets for rendered views
    pub latex_snippets: bool,
    /// Do not tag nodes by date
    pub ignore_dates: bool,
}

/// One planned rendering of (part of) the tree.
#[derive(Debug, Clone)]
pub struct RenderJob<'t> {
    /// File stem; unique within a plan
    pub name: String,
    /// Human-readable caption
    pub title: String,
    /// Labels leading to the subtree
    pub path: Vec<String>,
    /// None when `path` does not resolve
    pub subtree: Option<&'t TreeNode>,
    pub config: RenderConfig,
}

/// A view whose document was written and rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub name: String,
    pub title: String,
    pub document: PathBuf,
    pub image: PathBuf,
}

/// Result of processing one job.
#[derive(Debug)]
pub enum ViewOutcome {
    Rendered(RenderedView),
    Skipped { name: String, reason: String },
    Failed { name: String, error: ApplicationError },
}

/// Summary of a run, in plan order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub rendered: Vec<RenderedView>,
    pub skipped: Vec<(String, String)>,
    pub failed: Vec<(String, String)>,
    /// Snippet file, when requested and written
    pub snippets: Option<PathBuf>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Orchestrates a full render run.
pub struct RenderService {
    fs: Arc<dyn FileSystem>,
    dispatch: RenderDispatch,
    settings: Arc<Settings>,
    template: DocumentTemplate,
}

impl RenderService {
    pub fn new(fs: Arc<dyn FileSystem>, dispatch: RenderDispatch, settings: Arc<Settings>) -> Self {
        Self {
            fs,
            dispatch,
            settings,
            template: DocumentTemplate::default(),
        }
    }

    /// Read and convert the JSON classification tree.
    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, path: &Path) -> ApplicationResult<TreeNode> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree", path)?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| ApplicationError::OperationFailed {
                context: format!("parse tree {}", path.display()),
                source: Box::new(e),
            })?;
        let tree = TreeNode::from_json(&value)?;
        debug!(
            "load_tree: {} nodes, depth {}",
            tree.node_count(),
            tree.depth()
        );
        Ok(tree)
    }

    /// Plan configured views, then one view per top-level category, each
    /// optionally followed by a first-level-only variant `<stem>-overview`.
    ///
    /// Configured names pass through `file_stem` like category labels, so
    /// every document lands directly in the output directory. Names are made
    /// unique by suffixing `-2`, `-3`, ...
    pub fn plan<'t>(&self, tree: &'t TreeNode) -> Vec<RenderJob<'t>> {
        let mut jobs = Vec::new();
        let mut used = HashSet::new();

        for view in &self.settings.views {
            let root_label = view
                .root_label
                .clone()
                .or_else(|| view.path.last().cloned())
                .unwrap_or_else(|| self.settings.root_label.clone());
            let root_label = Some(root_label).filter(|l| !l.is_empty());
            jobs.push(RenderJob {
                name: unique_name(&file_stem(&view.name), &mut used),
                title: root_label.clone().unwrap_or_else(|| view.name.clone()),
                path: view.path.clone(),
                subtree: tree.descend(&view.path),
                config: RenderConfig {
                    max_depth: view.max_depth.unwrap_or(UNBOUNDED_DEPTH),
                    root_label,
                    side_switch: view.side_switch,
                },
            });
        }

        if self.settings.per_category {
            for (label, subtree) in tree.children().into_iter().flatten() {
                let stem = file_stem(label);
                let mut variants = vec![(stem.clone(), UNBOUNDED_DEPTH)];
                if self.settings.category_overviews {
                    let overview = Some(stem)
                        .filter(|s| !s.is_empty())
                        .map(|s| format!("{s}-overview"))
                        .unwrap_or_default();
                    variants.push((overview, 0));
                }
                for (name, max_depth) in variants {
                    jobs.push(RenderJob {
                        name: unique_name(&name, &mut used),
                        title: label.clone(),
                        path: vec![label.clone()],
                        subtree: Some(subtree),
                        config: RenderConfig {
                            max_depth,
                            root_label: Some(label.clone()),
                            side_switch: Some(SideSwitch::Half),
                        },
                    });
                }
            }
        }

        debug!("plan: {} jobs", jobs.len());
        jobs
    }

    /// Serialize a job's subtree into a complete document.
    pub fn render_document(
        &self,
        job: &RenderJob<'_>,
        serializer: &TreeSerializer<'_>,
    ) -> ApplicationResult<String> {
        if job.name.is_empty() {
            return Err(ApplicationError::MissingInput(format!(
                "view {:?} has no usable file name",
                job.title
            )));
        }
        let subtree = job.subtree.ok_or_else(|| {
            ApplicationError::MissingInput(format!(
                "view {}: no subtree at {:?}",
                job.name, job.path
            ))
        })?;
        let body = serializer.serialize(subtree, &job.config)?;
        Ok(self.template.assemble(&body))
    }

    /// Write a job's document and submit it to the renderer.
    fn process(&self, job: &RenderJob<'_>, serializer: &TreeSerializer<'_>) -> ViewOutcome {
        let document = match self.render_document(job, serializer) {
            Ok(text) => text,
            Err(ApplicationError::MissingInput(reason)) => {
                warn!("skipping view: {}", reason);
                return ViewOutcome::Skipped {
                    name: job.name.clone(),
                    reason,
                };
            }
            Err(e) => {
                error!("view {}: {}", job.name, e);
                return ViewOutcome::Failed {
                    name: job.name.clone(),
                    error: e,
                };
            }
        };

        let path = self.settings.document_path(&job.name);
        if let Err(e) = self
            .fs
            .write(&path, &document)
            .with_path_context("write document", &path)
        {
            error!("view {}: {}", job.name, e);
            return ViewOutcome::Failed {
                name: job.name.clone(),
                error: e,
            };
        }

        if let Err(e) = self.dispatch.submit(&path) {
            error!("view {}: {}", job.name, e);
            return ViewOutcome::Failed {
                name: job.name.clone(),
                error: e,
            };
        }

        info!("rendered {}", job.name);
        ViewOutcome::Rendered(RenderedView {
            name: job.name.clone(),
            title: job.title.clone(),
            document: path,
            image: self.settings.image_path(&job.name),
        })
    }

    /// Create the output directory and a fresh, empty image directory.
    ///
    /// Nothing is removed unless the image directory is a strict
    /// subdirectory of the output directory.
    pub fn prepare_output(&self) -> ApplicationResult<()> {
        self.settings.validate()?;
        let output_dir = &self.settings.output_dir;
        self.fs
            .create_dir_all(output_dir)
            .with_path_context("create output directory", output_dir)?;

        let image_dir = self.settings.image_dir();
        if self
            .fs
            .remove_dir_all(&image_dir)
            .allow_not_found("remove stale images", &image_dir)?
            .is_some()
        {
            debug!("prepare_output: removed {}", image_dir.display());
        }
        self.fs
            .create_dir_all(&image_dir)
            .with_path_context("create image directory", &image_dir)
    }

    /// Delete intermediate documents. Missing files are fine; other errors
    /// are logged and the remaining files are still removed.
    pub fn clean_up(&self, jobs: &[RenderJob<'_>]) -> usize {
        let mut removed = 0;
        for job in jobs.iter().filter(|j| !j.name.is_empty()) {
            let path = self.settings.document_path(&job.name);
            match self
                .fs
                .remove_file(&path)
                .allow_not_found("remove document", &path)
            {
                Ok(Some(())) => removed += 1,
                Ok(None) => {}
                Err(e) => warn!("cleanup: {}", e),
            }
        }
        debug!("clean_up: removed {} documents", removed);
        removed
    }

    /// Write one figure per rendered view into the snippet file.
    pub fn write_snippets(&self, rendered: &[RenderedView]) -> ApplicationResult<PathBuf> {
        let renderer = &self.settings.renderer;
        let content: String = rendered
            .iter()
            .map(|view| {
                let image = format!("{}/{}.{}", renderer.image_dir, view.name, renderer.format);
                figure_snippet(&image, &view.title, &view.name)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let path = self.settings.output_dir.join(SNIPPETS_FILE);
        self.fs
            .write(&path, &content)
            .with_path_context("write snippets", &path)?;
        Ok(path)
    }

    /// Full run: load, plan, render in parallel, clean up, write snippets.
    ///
    /// Per-view problems end up in the report; only failures that affect
    /// every view (unreadable tree, invalid style table, unusable output
    /// directory) are returned as errors.
    #[instrument(skip(self))]
    pub fn run(&self, options: &RunOptions) -> ApplicationResult<RunReport> {
        let tree = self.load_tree(&self.settings.input)?;
        let styles = StyleTable::new(&self.settings.styles)?;
        debug!("run: style tags {:?}", styles.tags());
        let serializer = if options.ignore_dates {
            TreeSerializer::without_dates()
        } else {
            TreeSerializer::new(&styles)
        };

        self.prepare_output()?;
        let jobs = self.plan(&tree);
        info!("rendering {} views", jobs.len());

        let outcomes: Vec<ViewOutcome> = jobs
            .par_iter()
            .map(|job| self.process(job, &serializer))
            .collect();

        let mut report = RunReport::default();
        for outcome in outcomes {
            match outcome {
                ViewOutcome::Rendered(view) => report.rendered.push(view),
                ViewOutcome::Skipped { name, reason } => report.skipped.push((name, reason)),
                ViewOutcome::Failed { name, error } => {
                    report.failed.push((name, error.to_string()))
                }
            }
        }

        if !options.keep_intermediate {
            self.clean_up(&jobs);
        }

        if options.latex_snippets {
            report.snippets = Some(self.write_snippets(&report.rendered)?);
        }

        info!(
            "rendered={}, skipped={}, failed={}",
            report.rendered.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if name.is_empty() {
        return String::new();
    }
    let mut candidate = name.to_string();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{name}-{n}");
        n += 1;
    }
    candidate
}
