//! The rendering seam.
//!
//! The pipeline never draws anything itself.  It hands a finished
//! [`SceneDescription`] to a [`RenderingAdapter`], which turns it into
//! whatever the outside world needs: an interactive 3-D view, an image, or
//! a file another process picks up.
//!
//! - [`RenderingAdapter`] – the trait every renderer implements.
//! - [`JsonSceneAdapter`] – writes the scene as JSON to any [`Write`] sink.

use std::io::Write;

use semmap_types::SceneError;
use tracing::debug;

use crate::scene::SceneDescription;

/// Every renderer must implement this trait.
///
/// # Contract
///
/// The adapter receives point sets, labeled points and line segments, each
/// with a color and a legend flag.  It must not assume anything else about
/// how the scene was produced.
pub trait RenderingAdapter {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Draw or export one scene.
    fn render(&mut self, scene: &SceneDescription) -> Result<(), SceneError>;
}

/// Serializes scenes as JSON.
pub struct JsonSceneAdapter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSceneAdapter<W> {
    /// Pretty-printed output.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: true,
        }
    }

    /// Single-line output.
    pub fn compact(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingAdapter for JsonSceneAdapter<W> {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&mut self, scene: &SceneDescription) -> Result<(), SceneError> {
        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, scene)
        } else {
            serde_json::to_writer(&mut self.writer, scene)
        };
        written.map_err(|e| SceneError::Render(format!("failed to serialize scene: {e}")))?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .map_err(|e| SceneError::Render(format!("failed to write scene: {e}")))?;
        debug!(adapter = self.name(), categories = scene.categories.len(), "scene exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MarkerSymbol, PointSet};
    use semmap_types::Point3;

    fn tiny_scene() -> SceneDescription {
        SceneDescription {
            obstacles: PointSet {
                name: Some("Occupancy Map".into()),
                label: None,
                points: vec![Point3::new(2.0, 3.0, 0.0)],
                color: "black".into(),
                symbol: MarkerSymbol::Circle,
                size: 1.0,
                show_in_legend: true,
            },
            categories: Vec::new(),
            view: None,
        }
    }

    #[test]
    fn json_adapter_round_trips_scene() {
        let mut adapter = JsonSceneAdapter::new(Vec::new());
        adapter.render(&tiny_scene()).unwrap();
        let bytes = adapter.into_inner();
        let back: SceneDescription = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, tiny_scene());
    }

    #[test]
    fn compact_output_is_one_line() {
        let mut adapter = JsonSceneAdapter::compact(Vec::new());
        adapter.render(&tiny_scene()).unwrap();
        let text = String::from_utf8(adapter.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"show_in_legend\":true"));
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_render_error() {
        let mut adapter = JsonSceneAdapter::new(FailingSink);
        let err = adapter.render(&tiny_scene()).unwrap_err();
        assert!(matches!(err, SceneError::Render(_)));
    }
}
