//! Cyclic category palette.
//!
//! Palette order matters: the n-th category encountered in the detection
//! graph takes color `n mod len`.  Colors are distinct, so two categories
//! share a color only once the palette has wrapped.  A palette file looks
//! like
//!
//! ```yaml
//! colors:
//!   - '#17becf'
//!   - '#ffbb78'
//! ```

use std::fs;
use std::path::Path;

use semmap_types::{ConfigError, LoadError, SceneError};
use serde::Deserialize;

const DEFAULT_COLORS: [&str; 22] = [
    "#17becf", "#ffbb78", "#c5b0d5", "#e377c2", "#023020", "#00008b", "#1f77b4", "#2ca02c",
    "#FF3131", "#9467bd", "#ff7f0e", "#8c564b", "#7f7f7f", "#bcbd22", "#98df8a", "#ff9896",
    "#c49c94", "#f7b6d2", "#e5cf0f", "#00a2e8", "#e58931", "#a6d0b5",
];

#[derive(Debug, Deserialize)]
struct PaletteFile {
    colors: Vec<String>,
}

/// A non-empty ordered sequence of distinct color identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// # Errors
    ///
    /// [`ConfigError::EmptyPalette`] when `colors` is empty,
    /// [`ConfigError::DuplicateColor`] when a color appears twice (hex
    /// digits compared case-insensitively).
    pub fn new(colors: Vec<String>) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        for (i, color) in colors.iter().enumerate() {
            if colors[..i].iter().any(|prev| prev.eq_ignore_ascii_case(color)) {
                return Err(ConfigError::DuplicateColor(color.clone()));
            }
        }
        Ok(Self { colors })
    }

    /// Parse a `colors:` YAML document.
    pub fn from_yaml_str(raw: &str) -> Result<Self, SceneError> {
        let file: PaletteFile = serde_yaml::from_str(raw)
            .map_err(|e| LoadError::Palette(format!("invalid palette file: {e}")))?;
        Ok(Self::new(file.colors)?)
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let raw = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Never true for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Palette slot used by the category at `ordinal`.
    pub fn index_for(&self, ordinal: usize) -> usize {
        ordinal % self.colors.len()
    }

    /// Color of the category at `ordinal`, wrapping past the end.
    pub fn color(&self, ordinal: usize) -> &str {
        &self.colors[self.index_for(ordinal)]
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone() -> Palette {
        Palette::new(vec!["red".into(), "blue".into()]).unwrap()
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert_eq!(Palette::new(Vec::new()), Err(ConfigError::EmptyPalette));
    }

    #[test]
    fn colors_cycle_past_the_end() {
        let p = two_tone();
        let indices: Vec<_> = (0..5).map(|i| p.index_for(i)).collect();
        assert_eq!(indices, vec![0, 1, 0, 1, 0]);
        assert_eq!(p.color(3), "blue");
    }

    #[test]
    fn default_palette_starts_with_light_blue() {
        let p = Palette::default();
        assert_eq!(p.len(), 22);
        assert_eq!(p.color(0), "#17becf");
        assert_eq!(p.color(22), "#17becf");
    }

    #[test]
    fn default_palette_colors_are_pairwise_distinct() {
        let p = Palette::default();
        for n in 1..=p.len() {
            let seen: std::collections::HashSet<String> =
                (0..n).map(|i| p.color(i).to_ascii_lowercase()).collect();
            assert_eq!(seen.len(), n, "first {n} categories share a color");
        }
        assert!(Palette::new(p.colors().to_vec()).is_ok());
    }

    #[test]
    fn repeated_color_is_rejected() {
        let err = Palette::new(vec!["#FF3131".into(), "blue".into(), "#ff3131".into()])
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateColor("#ff3131".into()));
    }

    #[test]
    fn yaml_palette_with_repeat_is_config_error() {
        let err = Palette::from_yaml_str("colors: [red, green, red]\n").unwrap_err();
        assert!(matches!(
            err,
            SceneError::Config(ConfigError::DuplicateColor(_))
        ));
    }

    #[test]
    fn yaml_palette_keeps_order() {
        let p = Palette::from_yaml_str("colors:\n  - '#000000'\n  - '#ffffff'\n  - green\n")
            .unwrap();
        assert_eq!(p.colors(), &["#000000", "#ffffff", "green"]);
    }

    #[test]
    fn yaml_palette_without_colors_is_config_error() {
        let err = Palette::from_yaml_str("colors: []\n").unwrap_err();
        assert!(matches!(err, SceneError::Config(ConfigError::EmptyPalette)));
    }

    #[test]
    fn malformed_yaml_is_load_error() {
        let err = Palette::from_yaml_str("shades: [1, 2]\n").unwrap_err();
        assert!(matches!(err, SceneError::Load(LoadError::Palette(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("color_palette.yaml");
        fs::write(&path, "colors: ['#123456']\n").expect("write palette");
        let p = Palette::load(&path).expect("load");
        assert_eq!(p.color(4), "#123456");
    }
}
