//! `semmap-scene` – layout, scene assembly and the pipeline that drives them.
//!
//! # Modules
//!
//! - [`config`] – [`SceneConfig`][config::SceneConfig]: every constant the
//!   pipeline needs (head spacing, z-layers, offsets, feature flags), with
//!   the single-layer and stratified presets.
//! - [`layout`] – [`CircularLayout`][layout::CircularLayout]: one head anchor
//!   per category, evenly spaced on a circle around the obstacle centroid.
//! - [`scene`] – [`SceneDescription`][scene::SceneDescription]: the
//!   serializable output handed to a renderer.
//! - [`builder`] – [`SceneGraphBuilder`][builder::SceneGraphBuilder]: turns
//!   obstacles, the category index and head anchors into a scene.
//! - [`pipeline`] – [`ScenePipeline`][pipeline::ScenePipeline]: runs
//!   load → obstacles → categories → layout → build in order.
//! - [`adapter`] – [`RenderingAdapter`][adapter::RenderingAdapter]: the seam
//!   to an external renderer, plus a JSON exporter.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber.

pub mod adapter;
pub mod builder;
pub mod config;
pub mod layout;
pub mod pipeline;
pub mod scene;
pub mod telemetry;

pub use adapter::{JsonSceneAdapter, RenderingAdapter};
pub use builder::SceneGraphBuilder;
pub use config::{LayerPair, MemberLayer, SceneConfig};
pub use layout::{CircularLayout, HeadAnchor};
pub use pipeline::{PipelineInputs, ScenePipeline};
pub use scene::{CategoryScene, Edge, EdgeKind, MarkerSymbol, PointSet, SceneDescription, ViewBox};
pub use telemetry::init_tracing;
