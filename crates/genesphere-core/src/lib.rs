//! Backend-free engine for the GeneSphere network view.
//!
//! The crate owns everything between a parsed dataset and the instanced
//! primitives a renderer draws: scoring and hub classification, spherical
//! layouts, the per-frame animation tick, pointer hit-testing and the glow
//! profile of a hovered edge. Renderers plug in through [`RenderAdapter`].

pub mod adapter;
pub mod animation;
pub mod dataset;
pub mod error;
pub mod highlight;
pub mod instances;
pub mod interaction;
pub mod labels;
pub mod layout;
pub mod model;
pub mod params;
pub mod picking;
pub mod session;
pub mod style;

pub use adapter::{InstanceCategory, InstanceCounts, InstanceTransform, PointerAffordance, RenderAdapter};
pub use dataset::{Dataset, DatasetFormat, RawLink, RawNode};
pub use error::{ColorParseError, LoadError};
pub use highlight::HighlightProfile;
pub use interaction::{Connection, EdgeTooltip, HoverPayload, NodeTooltip, SelectionState, Viewport};
pub use labels::HubLabel;
pub use layout::LayoutMode;
pub use model::{GeneEdge, GeneModel, GeneNode};
pub use params::EngineParams;
pub use session::{FrameReport, ViewSession};
pub use style::{Palette, Srgb};
