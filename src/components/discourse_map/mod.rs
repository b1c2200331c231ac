mod component;
mod detail;
mod graph;
mod render;
mod state;
mod types;

pub use component::DiscourseMapCanvas;
pub use detail::DetailOverlay;
pub use graph::{BuildError, RelationClass, RenderableGraph, build};
pub use state::Selection;
pub use types::{DiscourseEdge, DiscourseNode};
