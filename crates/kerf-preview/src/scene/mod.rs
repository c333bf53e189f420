//! Render-side representation of the toolpath.
//!
//! The presentation side only posts requests through [`RequestMailbox`];
//! [`SceneCache`] and its layers live on the render thread and publish
//! [`SceneStats`] for readers.

mod cache;
mod layer;
mod mailbox;
mod palette;

pub use cache::{LayerStats, SceneCache, SceneStats};
pub use layer::{LayerId, LayerKind, LayerStyle, PathLayer, Renderable};
pub use mailbox::{RequestMailbox, Requests};
pub use palette::ColorScheme;
