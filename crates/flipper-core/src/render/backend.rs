//! Host GPU backend trait. Batch execution goes through this.
//!
//! The backend is a conventional immediate-state 3D API: pipeline
//! switches, numbered texture units, vertex upload plus submission for
//! the display-list topologies. Per-draw state changes are assumed
//! costly, which is why the batch layer avoids redundant switches and
//! caches whole decoded batches.

use crate::error::BackendError;
use crate::gx::display_list::{Topology, Vertex};
use crate::render::picker::PickerId;
use crate::scene::shader::{PipelineState, TextureBinding};

pub trait RenderBackend {
    /// Apply blend/depth/alpha-test/cull state in one switch.
    fn set_pipeline(&mut self, state: &PipelineState) -> Result<(), BackendError>;

    /// Bind a texture (or the transparent placeholder) to a unit.
    fn bind_texture(&mut self, unit: u8, binding: &TextureBinding) -> Result<(), BackendError>;

    /// Tag subsequent draws with a picker ID. Only meaningful during an
    /// ID-encoded hit-test pass; other backends may ignore it.
    fn set_picker(&mut self, id: PickerId) -> Result<(), BackendError> {
        let _ = id;
        Ok(())
    }

    /// Upload and draw one vertex run.
    fn draw(&mut self, topology: Topology, verts: &[Vertex]) -> Result<(), BackendError>;
}

/// Backend that accepts everything and draws nothing. Useful for
/// decode-only runs and as the execution target in tests.
#[derive(Default)]
pub struct NullBackend;

impl RenderBackend for NullBackend {
    fn set_pipeline(&mut self, _state: &PipelineState) -> Result<(), BackendError> {
        Ok(())
    }

    fn bind_texture(&mut self, _unit: u8, _binding: &TextureBinding) -> Result<(), BackendError> {
        Ok(())
    }

    fn draw(&mut self, _topology: Topology, _verts: &[Vertex]) -> Result<(), BackendError> {
        Ok(())
    }
}
