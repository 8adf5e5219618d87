//! Scene configuration.
//!
//! One [`SceneConfig`] is built per run and passed down to every stage.  Two
//! presets cover the layouts the pipeline is normally used for:
//!
//! | Preset | Layers | Vertical links | Children | Spacing | y offset |
//! |---|---|---|---|---|---|
//! | [`single_layer`][SceneConfig::single_layer] | detection (2.5) | no | yes | 30 | 0 |
//! | [`stratified`][SceneConfig::stratified] | detection (2.5) + base (0) | 2.5 ↔ 0 | no | 50 | 1.7 |

use semmap_semantic::detection::DetectionFrame;
use semmap_types::ConfigError;
use serde::{Deserialize, Serialize};

use crate::scene::MarkerSymbol;

/// One elevation at which category members are drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLayer {
    pub z: f64,
    #[serde(default = "default_member_symbol")]
    pub symbol: MarkerSymbol,
    #[serde(default = "default_member_size")]
    pub size: f64,
    /// Draw an edge from the category head to every member on this layer.
    #[serde(default)]
    pub link_head: bool,
}

impl MemberLayer {
    pub fn new(z: f64, symbol: MarkerSymbol, size: f64, link_head: bool) -> Self {
        Self {
            z,
            symbol,
            size,
            link_head,
        }
    }
}

/// Two layers joined by a vertical edge per member, as indices into
/// [`SceneConfig::layers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerPair {
    pub upper: usize,
    pub lower: usize,
}

/// Every constant the scene pipeline reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Radius of the head-anchor circle.
    pub spacing: f64,
    /// Elevation of head anchors.
    pub head_z: f64,
    /// Elevation detections are moved to when loaded.
    pub detection_z: f64,
    /// Elevation of child detections.
    pub child_z: f64,
    /// Added to the world y of every raster cell.
    pub vertical_offset: f64,
    /// Negate y of detection poses.
    pub flip_graph_y: bool,
    /// Negate y of child poses.
    pub flip_child_y: bool,
    pub layers: Vec<MemberLayer>,
    pub vertical_link: Option<LayerPair>,
    /// Draw child detections and their parent edges.
    pub include_children: bool,
    pub edge_width: f64,
    /// Padding around the obstacle bounds in the suggested view.
    pub view_margin: f64,
}

fn default_member_symbol() -> MarkerSymbol {
    MarkerSymbol::Circle
}
fn default_member_size() -> f64 {
    3.0
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spacing: 30.0,
            head_z: 5.0,
            detection_z: 2.5,
            child_z: 0.0,
            vertical_offset: 0.0,
            flip_graph_y: true,
            flip_child_y: false,
            layers: vec![MemberLayer::new(2.5, MarkerSymbol::Circle, 3.0, true)],
            vertical_link: None,
            include_children: false,
            edge_width: 1.0,
            view_margin: 10.0,
        }
    }
}

impl SceneConfig {
    /// Detections on one elevated layer, linked to their heads, with children.
    pub fn single_layer() -> Self {
        Self {
            include_children: true,
            ..Self::default()
        }
    }

    /// Detections drawn both elevated and on the occupancy layer, joined by
    /// vertical edges.
    pub fn stratified() -> Self {
        Self {
            spacing: 50.0,
            vertical_offset: 1.7,
            layers: vec![
                MemberLayer::new(2.5, MarkerSymbol::Circle, 3.0, true),
                MemberLayer::new(0.0, MarkerSymbol::Square, 4.0, false),
            ],
            vertical_link: Some(LayerPair { upper: 0, lower: 1 }),
            include_children: false,
            edge_width: 0.5,
            ..Self::default()
        }
    }

    /// How the detection loader should place graph poses.
    pub fn detection_frame(&self) -> DetectionFrame {
        DetectionFrame {
            detection_z: self.detection_z,
            child_z: self.child_z,
            flip_y: self.flip_graph_y,
            flip_child_y: self.flip_child_y,
        }
    }

    /// Reject settings that cannot produce a scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spacing.is_finite() && self.spacing >= 0.0) {
            return Err(ConfigError::NegativeSpacing(self.spacing));
        }
        for (field, value) in [
            ("head_z", self.head_z),
            ("detection_z", self.detection_z),
            ("child_z", self.child_z),
            ("vertical_offset", self.vertical_offset),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value}")));
            }
        }
        if !(self.edge_width.is_finite() && self.edge_width > 0.0) {
            return Err(invalid(
                "edge_width",
                format!("must be positive, got {}", self.edge_width),
            ));
        }
        if !(self.view_margin.is_finite() && self.view_margin >= 0.0) {
            return Err(invalid(
                "view_margin",
                format!("must be non-negative, got {}", self.view_margin),
            ));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if !layer.z.is_finite() {
                return Err(invalid("layers", format!("layer {i} has a non-finite z")));
            }
            if !(layer.size.is_finite() && layer.size > 0.0) {
                return Err(invalid(
                    "layers",
                    format!("layer {i} marker size must be positive"),
                ));
            }
        }
        if let Some(pair) = self.vertical_link {
            let n = self.layers.len();
            if pair.upper >= n || pair.lower >= n {
                return Err(invalid(
                    "vertical_link",
                    format!("layer index out of range for {n} layer(s)"),
                ));
            }
            if pair.upper == pair.lower {
                return Err(invalid("vertical_link", "must join two different layers".into()));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        assert!(SceneConfig::default().validate().is_ok());
        assert!(SceneConfig::single_layer().validate().is_ok());
        assert!(SceneConfig::stratified().validate().is_ok());
    }

    #[test]
    fn default_has_no_offset_and_no_children() {
        let cfg = SceneConfig::default();
        assert_eq!(cfg.vertical_offset, 0.0);
        assert!(!cfg.include_children);
        assert_eq!(cfg.layers.len(), 1);
    }

    #[test]
    fn stratified_links_detection_and_base_layers() {
        let cfg = SceneConfig::stratified();
        let pair = cfg.vertical_link.unwrap();
        assert_eq!(cfg.layers[pair.upper].z, 2.5);
        assert_eq!(cfg.layers[pair.lower].z, 0.0);
        assert!((cfg.vertical_offset - 1.7).abs() < 1e-12);
    }

    #[test]
    fn negative_spacing_is_rejected() {
        let cfg = SceneConfig {
            spacing: -1.0,
            ..SceneConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NegativeSpacing(-1.0)));
    }

    #[test]
    fn zero_spacing_is_allowed() {
        let cfg = SceneConfig {
            spacing: 0.0,
            ..SceneConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn vertical_link_must_reference_existing_layers() {
        let cfg = SceneConfig {
            vertical_link: Some(LayerPair { upper: 0, lower: 1 }),
            ..SceneConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "vertical_link", .. })
        ));

        let mut cfg = SceneConfig::stratified();
        cfg.vertical_link = Some(LayerPair { upper: 1, lower: 1 });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_positive_marker_size_is_rejected() {
        let mut cfg = SceneConfig::default();
        cfg.layers[0].size = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "layers", .. })
        ));
    }

    #[test]
    fn detection_frame_mirrors_config() {
        let cfg = SceneConfig {
            detection_z: 4.0,
            child_z: -1.0,
            flip_graph_y: false,
            flip_child_y: true,
            ..SceneConfig::default()
        };
        let frame = cfg.detection_frame();
        assert_eq!(frame.detection_z, 4.0);
        assert_eq!(frame.child_z, -1.0);
        assert!(!frame.flip_y);
        assert!(frame.flip_child_y);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SceneConfig =
            serde_json::from_str(r#"{"spacing": 12.0, "layers": [{"z": 1.0}]}"#).unwrap();
        assert_eq!(cfg.spacing, 12.0);
        assert_eq!(cfg.head_z, 5.0);
        assert_eq!(cfg.layers[0].symbol, MarkerSymbol::Circle);
        assert!(!cfg.layers[0].link_head);
    }
}
