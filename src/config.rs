//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mindmap/mindmap.toml`
//! 3. Local config: `./.mindmap.toml`, or the file given with `--config`
//! 4. Environment variables: `MINDMAP_*` prefix (`__` separates sections)

use std::path::{Component, Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{SideSwitch, StyleRule};

/// Name of the local config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".mindmap.toml";

/// External renderer invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RendererConfig {
    /// Executable used to launch the renderer (default: java)
    pub command: String,
    /// PlantUML jar passed with `-jar`
    pub jar: PathBuf,
    /// Image format, passed as `-t<format>` and used as image extension
    pub format: String,
    /// Image directory, relative to the output directory
    pub image_dir: String,
    /// Value for `-DPLANTUML_LIMIT_SIZE`
    pub limit_size: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: "java".into(),
            jar: PathBuf::from("plantuml.jar"),
            format: "png".into(),
            image_dir: "generated".into(),
            limit_size: 24384,
        }
    }
}

/// Raw renderer config for intermediate parsing (Option detects "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRendererConfig {
    pub command: Option<String>,
    pub jar: Option<PathBuf>,
    pub format: Option<String>,
    pub image_dir: Option<String>,
    pub limit_size: Option<u32>,
}

impl RendererConfig {
    /// Overlay wins for every field it specifies.
    pub fn merge(&self, overlay: &RawRendererConfig) -> Self {
        Self {
            command: overlay.command.clone().unwrap_or_else(|| self.command.clone()),
            jar: overlay.jar.clone().unwrap_or_else(|| self.jar.clone()),
            format: overlay.format.clone().unwrap_or_else(|| self.format.clone()),
            image_dir: overlay
                .image_dir
                .clone()
                .unwrap_or_else(|| self.image_dir.clone()),
            limit_size: overlay.limit_size.unwrap_or(self.limit_size),
        }
    }
}

/// One configured rendering of the tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewConfig {
    /// File stem of the generated document and image
    pub name: String,
    /// Labels leading from the tree root to the rendered subtree (empty = whole tree)
    #[serde(default)]
    pub path: Vec<String>,
    /// Label of the root line (default: last path label, or the global root label)
    #[serde(default)]
    pub root_label: Option<String>,
    /// Levels below the root to render (default: unbounded)
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// First-level position after which siblings move to the other side
    #[serde(default)]
    pub side_switch: Option<SideSwitch>,
}

fn default_views() -> Vec<ViewConfig> {
    vec![
        ViewConfig {
            name: "mindmap".into(),
            path: vec![],
            root_label: None,
            max_depth: None,
            side_switch: Some(SideSwitch::Half),
        },
        ViewConfig {
            name: "mindmap-overview".into(),
            path: vec![],
            root_label: None,
            max_depth: Some(0),
            side_switch: Some(SideSwitch::Half),
        },
    ]
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub root_label: Option<String>,
    pub extension: Option<String>,
    pub per_category: Option<bool>,
    pub category_overviews: Option<bool>,
    pub renderer: RawRendererConfig,
    pub views: Option<Vec<ViewConfig>>,
    pub styles: Option<Vec<StyleRule>>,
}

/// Unified configuration for mindmap rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// JSON classification tree
    pub input: PathBuf,
    /// Directory receiving documents, images and snippets
    pub output_dir: PathBuf,
    /// Root label for views over the whole tree
    pub root_label: String,
    /// Extension of intermediate documents
    pub extension: String,
    /// Also render one view per top-level category
    pub per_category: bool,
    /// With `per_category`, also render each category cut below its first level
    pub category_overviews: bool,
    /// External renderer settings
    pub renderer: RendererConfig,
    /// Configured views, rendered in order
    pub views: Vec<ViewConfig>,
    /// Date thresholds for style tags
    pub styles: Vec<StyleRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("limitations.json"),
            output_dir: PathBuf::from("mindmaps"),
            root_label: "Limitations".into(),
            extension: "puml".into(),
            per_category: true,
            category_overviews: true,
            renderer: RendererConfig::default(),
            views: default_views(),
            styles: crate::domain::StyleTable::builtin_rules(),
        }
    }
}

/// Get the XDG config directory for mindmap.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mindmap").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mindmap.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`, leaving the input untouched on failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Path of the intermediate document for a view.
    pub fn document_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", name, self.extension))
    }

    /// Image directory (output_dir/image_dir).
    pub fn image_dir(&self) -> PathBuf {
        self.output_dir.join(&self.renderer.image_dir)
    }

    /// Path of the rendered image for a view.
    pub fn image_path(&self, name: &str) -> PathBuf {
        self.image_dir()
            .join(format!("{}.{}", name, self.renderer.format))
    }

    /// Reject settings that would make a run touch files outside its own outputs.
    ///
    /// The image directory is emptied on every run, so it must be a strict
    /// subdirectory of the output directory: relative, non-empty, and made of
    /// plain names only (no `.`, `..` or root).
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let image_dir = Path::new(&self.renderer.image_dir);
        let plain = image_dir.components().next().is_some()
            && image_dir
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(ApplicationError::Config {
                message: format!(
                    "renderer.image_dir must be a subdirectory of the output directory, got {:?}",
                    self.renderer.image_dir
                ),
            });
        }
        Ok(())
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.input = PathBuf::from(expand_env_vars(&self.input.to_string_lossy()));
        self.output_dir = PathBuf::from(expand_env_vars(&self.output_dir.to_string_lossy()));
        self.renderer.jar = PathBuf::from(expand_env_vars(&self.renderer.jar.to_string_lossy()));
    }

    /// Overlay wins for every field it specifies; lists are replaced, not merged.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            input: overlay.input.clone().unwrap_or_else(|| self.input.clone()),
            output_dir: overlay
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            root_label: overlay
                .root_label
                .clone()
                .unwrap_or_else(|| self.root_label.clone()),
            extension: overlay
                .extension
                .clone()
                .unwrap_or_else(|| self.extension.clone()),
            per_category: overlay.per_category.unwrap_or(self.per_category),
            category_overviews: overlay
                .category_overviews
                .unwrap_or(self.category_overviews),
            renderer: self.renderer.merge(&overlay.renderer),
            views: overlay.views.clone().unwrap_or_else(|| self.views.clone()),
            styles: overlay.styles.clone().unwrap_or_else(|| self.styles.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; must exist when given.
    ///   Without it, `./.mindmap.toml` is used if present.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        match local {
            Some(path) => {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
            None => {
                let path = Path::new(LOCAL_CONFIG_FILE);
                if path.exists() {
                    let raw = load_raw_settings(path)?;
                    current = current.merge_with(&raw);
                }
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Load defaults plus exactly one config file (no global config, no env vars).
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let mut settings = Self::default().merge_with(&raw);
        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply MINDMAP_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("MINDMAP")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("input") {
            settings.input = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("root_label") {
            settings.root_label = val;
        }
        if let Ok(val) = config.get_string("extension") {
            settings.extension = val;
        }
        if let Ok(val) = config.get_bool("per_category") {
            settings.per_category = val;
        }
        if let Ok(val) = config.get_bool("category_overviews") {
            settings.category_overviews = val;
        }
        if let Ok(val) = config.get_string("renderer.command") {
            settings.renderer.command = val;
        }
        if let Ok(val) = config.get_string("renderer.jar") {
            settings.renderer.jar = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("renderer.format") {
            settings.renderer.format = val;
        }
        if let Ok(val) = config.get_string("renderer.image_dir") {
            settings.renderer.image_dir = val;
        }
        if let Ok(val) = config.get_int("renderer.limit_size") {
            settings.renderer.limit_size = u32::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("renderer.limit_size out of range: {val}"),
            })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_defaults_then_render_whole_tree_and_overview() {
        let settings = Settings::default();
        let names: Vec<_> = settings.views.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["mindmap", "mindmap-overview"]);
        assert_eq!(settings.views[1].max_depth, Some(0));
        assert!(settings.per_category);
        assert_eq!(settings.renderer.command, "java");
    }

    #[test]
    fn given_view_name_when_building_paths_then_uses_extension_and_format() {
        let settings = Settings {
            output_dir: PathBuf::from("out"),
            ..Settings::default()
        };
        assert_eq!(settings.document_path("overview"), PathBuf::from("out/overview.puml"));
        assert_eq!(
            settings.image_path("overview"),
            PathBuf::from("out/generated/overview.png")
        );
    }

    #[test]
    fn given_tilde_in_paths_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            output_dir: PathBuf::from("~/mindmaps"),
            ..Settings::default()
        };
        settings.renderer.jar = PathBuf::from("${HOME}/lib/plantuml.jar");

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.output_dir.to_string_lossy().starts_with(&home));
        assert!(settings.renderer.jar.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            root_label: Some("Einschränkungen".into()),
            renderer: RawRendererConfig {
                format: Some("svg".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.root_label, "Einschränkungen");
        assert_eq!(merged.renderer.format, "svg");
        assert_eq!(merged.renderer.command, base.renderer.command);
        assert_eq!(merged.views, base.views);
    }

    #[test]
    fn given_views_in_overlay_when_merging_then_replaces_list() {
        let overlay: RawSettings = toml::from_str(
            r#"
[[views]]
name = "physical"
path = ["Körperliche Einschränkungen"]
max_depth = 1
side_switch = 2
"#,
        )
        .unwrap();

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.views.len(), 1);
        assert_eq!(merged.views[0].side_switch, Some(SideSwitch::Index(2)));
        assert_eq!(merged.views[0].path, vec!["Körperliche Einschränkungen"]);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("./")]
    #[case("..")]
    #[case("images/../..")]
    #[case("/tmp/images")]
    fn given_image_dir_outside_output_when_validating_then_config_error(#[case] image_dir: &str) {
        let mut settings = Settings::default();
        settings.renderer.image_dir = image_dir.into();

        let err = settings.validate().unwrap_err();

        assert!(matches!(err, ApplicationError::Config { .. }), "{image_dir:?}: {err}");
    }

    #[rstest]
    #[case("generated")]
    #[case("figures/mindmaps")]
    fn given_plain_image_dir_when_validating_then_ok(#[case] image_dir: &str) {
        let mut settings = Settings::default();
        settings.renderer.image_dir = image_dir.into();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        assert!(text.contains("side_switch = \"half\""));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
