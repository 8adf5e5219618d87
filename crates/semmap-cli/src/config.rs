//! Run configuration – reads `semmap.toml`.
//!
//! ```toml
//! map_yaml = "maps/office.yaml"
//! graph_json = "graphs/office.json"
//! palette_yaml = "color_palette.yaml"
//! output = "scene.json"
//! preset = "stratified"
//!
//! [scene]
//! spacing = 40.0
//! include_children = true
//! vertical_link = false   # or { upper = 0, lower = 1 }
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use semmap_scene::config::{LayerPair, MemberLayer, SceneConfig};
use semmap_scene::pipeline::PipelineInputs;
use semmap_semantic::palette::Palette;
use semmap_types::SceneError;
use serde::{Deserialize, Serialize};

/// Starting point for the scene settings, before `[scene]` overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Default,
    SingleLayer,
    Stratified,
}

impl Preset {
    pub fn scene_config(self) -> SceneConfig {
        match self {
            Preset::Default => SceneConfig::default(),
            Preset::SingleLayer => SceneConfig::single_layer(),
            Preset::Stratified => SceneConfig::stratified(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Default => write!(f, "default"),
            Preset::SingleLayer => write!(f, "single_layer"),
            Preset::Stratified => write!(f, "stratified"),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" => Ok(Preset::Default),
            "single_layer" => Ok(Preset::SingleLayer),
            "stratified" => Ok(Preset::Stratified),
            other => Err(format!("unknown preset '{other}'")),
        }
    }
}

/// `[scene] vertical_link`: a layer pair, or `false` to drop the preset's
/// link.  `true` keeps whatever the preset has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerticalLinkOverride {
    Enabled(bool),
    Pair(LayerPair),
}

impl VerticalLinkOverride {
    fn apply(self, current: Option<LayerPair>) -> Option<LayerPair> {
        match self {
            VerticalLinkOverride::Enabled(false) => None,
            VerticalLinkOverride::Enabled(true) => current,
            VerticalLinkOverride::Pair(pair) => Some(pair),
        }
    }
}

/// Individual `[scene]` settings laid over the preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOverrides {
    pub spacing: Option<f64>,
    pub head_z: Option<f64>,
    pub detection_z: Option<f64>,
    pub child_z: Option<f64>,
    pub vertical_offset: Option<f64>,
    pub flip_graph_y: Option<bool>,
    pub flip_child_y: Option<bool>,
    pub layers: Option<Vec<MemberLayer>>,
    pub vertical_link: Option<VerticalLinkOverride>,
    pub include_children: Option<bool>,
    pub edge_width: Option<f64>,
    pub view_margin: Option<f64>,
}

impl SceneOverrides {
    pub fn apply(&self, mut cfg: SceneConfig) -> SceneConfig {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field.clone() {
                    cfg.$field = v;
                })*
            };
        }
        take!(
            spacing,
            head_z,
            detection_z,
            child_z,
            vertical_offset,
            flip_graph_y,
            flip_child_y,
            layers,
            include_children,
            edge_width,
            view_margin
        );
        if let Some(link) = self.vertical_link {
            cfg.vertical_link = link.apply(cfg.vertical_link);
        }
        cfg
    }
}

/// Contents of `semmap.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Map sidecar (resolution, origin, optional image).
    #[serde(default = "default_map_yaml")]
    pub map_yaml: PathBuf,

    /// Raster image; the sidecar's `image:` entry is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_image: Option<PathBuf>,

    /// Node-link detection graph.
    #[serde(default = "default_graph_json")]
    pub graph_json: PathBuf,

    /// `colors:` YAML palette.  Takes precedence over `palette`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette_yaml: Option<PathBuf>,

    /// Inline palette.  The built-in palette is used when both this and
    /// `palette_yaml` are absent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<String>,

    /// Scene JSON destination; stdout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub preset: Preset,

    #[serde(default)]
    pub scene: SceneOverrides,
}

fn default_map_yaml() -> PathBuf {
    PathBuf::from("map.yaml")
}
fn default_graph_json() -> PathBuf {
    PathBuf::from("graph.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_yaml: default_map_yaml(),
            map_image: None,
            graph_json: default_graph_json(),
            palette_yaml: None,
            palette: Vec::new(),
            output: None,
            preset: Preset::default(),
            scene: SceneOverrides::default(),
        }
    }
}

impl Config {
    /// Preset with `[scene]` overrides applied.
    pub fn scene_config(&self) -> SceneConfig {
        self.scene.apply(self.preset.scene_config())
    }

    pub fn pipeline_inputs(&self) -> PipelineInputs {
        PipelineInputs {
            map_yaml: self.map_yaml.clone(),
            map_image: self.map_image.clone(),
            graph_json: self.graph_json.clone(),
        }
    }

    /// Palette from `palette_yaml`, else `palette`, else the built-in one.
    pub fn load_palette(&self) -> Result<Palette, SceneError> {
        if let Some(path) = &self.palette_yaml {
            return Palette::load(path);
        }
        if self.palette.is_empty() {
            return Ok(Palette::default());
        }
        Ok(Palette::new(self.palette.clone())?)
    }

    /// Anchor every relative path at `base`.
    fn resolve_relative(&mut self, base: &Path) {
        let anchor = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        anchor(&mut self.map_yaml);
        anchor(&mut self.graph_json);
        for p in [&mut self.map_image, &mut self.palette_yaml, &mut self.output]
            .into_iter()
            .flatten()
        {
            anchor(p);
        }
    }
}

/// Held by every test that reads or writes `SEMMAP_*` variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// `./semmap.toml`.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("semmap.toml")
}

/// Load the config from `path` and apply environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, String> {
    let Some(mut cfg) = parse_file(path)? else {
        return Ok(None);
    };
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Read and parse `path` without consulting the environment.
pub(crate) fn parse_file(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    if let Some(dir) = path.parent() {
        cfg.resolve_relative(dir);
    }
    Ok(Some(cfg))
}

/// Apply `SEMMAP_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SEMMAP_MAP_YAML` | `map_yaml` |
/// | `SEMMAP_GRAPH` | `graph_json` |
/// | `SEMMAP_OUTPUT` | `output` |
/// | `SEMMAP_PRESET` | `preset` (unknown names are ignored) |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("SEMMAP_MAP_YAML") {
        cfg.map_yaml = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("SEMMAP_GRAPH") {
        cfg.graph_json = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("SEMMAP_OUTPUT") {
        cfg.output = Some(PathBuf::from(v));
    }
    if let Ok(v) = std::env::var("SEMMAP_PRESET") {
        match v.parse::<Preset>() {
            Ok(preset) => cfg.preset = preset,
            Err(e) => tracing::warn!(error = %e, "ignoring SEMMAP_PRESET"),
        }
    }
}
