//! Overlay pipeline construction.
//!
//! Given a brand and the probed frame size, this module decides which
//! branding layers apply, where they go and in what order, and produces a
//! filtergraph description with exactly one terminal label.
//!
//! # Components
//!
//! - [`orientation`]: tall / square / wide classification
//! - [`assets`]: stored-reference then naming-convention asset lookup
//! - [`geometry`]: layer sizes and anchors
//! - [`graph`]: typed operation nodes and terminal marking
//! - [`builder`]: the ordered layer stages and final validation
//!
//! # Example
//!
//! ```no_run
//! use brandmark::brand::Brand;
//! use brandmark::config::AssetsConfig;
//! use brandmark::overlay::{AssetResolver, FrameSize, PipelineBuilder};
//!
//! let builder = PipelineBuilder::new(AssetResolver::new(AssetsConfig::default()));
//! let description = builder.build(&Brand::new("ExampleWTF"), FrameSize::new(720, 1280))?;
//! println!("{}", description.filter_complex);
//! # Ok::<(), brandmark::overlay::BuildError>(())
//! ```

pub mod assets;
pub mod builder;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod orientation;
pub mod text;

pub use assets::{AssetResolver, AssetSource, LogoInspection, ResolvedAsset};
pub use builder::{
    BuildContext, LayerStage, LogoStage, PipelineBuilder, PipelineDescription, TextStage,
    WatermarkStage,
};
pub use error::{AssetError, BuildError};
pub use geometry::{AssetDimensions, Coord, FrameSize};
pub use graph::{FilterGraph, FilterNode, Pad};
pub use orientation::{classify, Orientation};
