pub mod error;
pub mod gx;
pub mod render;
pub mod scene;

pub use error::{BackendError, DecodeError, XfError};
pub use render::backend::RenderBackend;
pub use render::batch::RenderBatch;
pub use scene::entity::{EntityId, EntityRenderer, ModelAssets, RenderParams};
