//! `semmap-semantic` – the detection graph side of the scene pipeline.
//!
//! # Modules
//!
//! - [`detection`] – [`DetectionGraph`][detection::DetectionGraph]: loads a
//!   node-link detection graph and yields transformed
//!   [`DetectionNode`][detection::DetectionNode]s in serialized order.
//! - [`category`] – [`CategoryIndex`][category::CategoryIndex]: groups
//!   detections by category in first-occurrence order.  That order fixes
//!   each category's color and head-anchor angle.
//! - [`palette`] – [`Palette`][palette::Palette]: the cyclic color sequence
//!   categories draw from.

pub mod category;
pub mod detection;
pub mod palette;

pub use category::{CategoryIndex, Family};
pub use detection::{ChildNode, DetectionFrame, DetectionGraph, DetectionNode};
pub use palette::Palette;
