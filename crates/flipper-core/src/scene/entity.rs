//! Per-entity render orchestration: asset model, batch cache, render
//! entry points.
//!
//! Decoding an instruction stream is far more expensive than replaying
//! its batch, so batches are built lazily per `(entity, stream,
//! params)` key and replayed until the entity's assets are unloaded.
//! Hit-test passes are the exception: each pass must register fresh
//! picker IDs, so picking batches are rebuilt every call instead of
//! cached.

use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;

use crate::gx::display_list::{Arrays, DecodeOptions};
use crate::gx::regs::{VatSlot, NUM_ARRAYS};
use crate::gx::GxState;
use crate::render::backend::RenderBackend;
use crate::render::batch::{BatchStats, RenderBatch};
use crate::render::picker::PickerRegistry;
use crate::scene::interp::SceneInterp;
use crate::scene::shader::ShaderRecord;

/// Opaque handle for one loaded entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Map cells carry their placement baked into the cell geometry, so
/// the matrix-preload opcodes are inert for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Character,
    MapCell,
}

/// Render-call options that change what a decode produces; part of the
/// batch cache key for that reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderParams {
    /// Also decode lists whose shader is flagged hidden.
    pub show_hidden: bool,
    /// Hit-test pass: tag every display-list call with a picker ID.
    pub picking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BatchKey {
    entity: EntityId,
    stream: usize,
    params: RenderParams,
}

/// Owned big-endian attribute source buffers for one entity.
#[derive(Default)]
pub struct SourceBuffers {
    pub pos: Vec<u8>,
    pub nrm: Vec<u8>,
    pub colors: [Vec<u8>; 2],
    pub tex: [Vec<u8>; 8],
}

impl SourceBuffers {
    pub fn as_arrays(&self) -> Arrays<'_> {
        Arrays {
            pos: &self.pos,
            nrm: &self.nrm,
            colors: [&self.colors[0], &self.colors[1]],
            tex: [
                &self.tex[0], &self.tex[1], &self.tex[2], &self.tex[3], &self.tex[4],
                &self.tex[5], &self.tex[6], &self.tex[7],
            ],
        }
    }
}

/// Everything the interpreter consumes for one entity, supplied
/// pre-parsed and pre-decompressed by the asset-loading layer.
pub struct ModelAssets {
    pub kind: EntityKind,
    /// Bit-packed instruction streams, one per visual.
    pub streams: Vec<Vec<u8>>,
    /// Display-list blobs addressable by the call opcode.
    pub display_lists: Vec<Vec<u8>>,
    pub buffers: SourceBuffers,
    /// Byte strides for the attribute arrays, in register order.
    pub strides: [u16; NUM_ARRAYS],
    /// Format template; the change-vertex-format opcode only chooses
    /// index widths on top of this.
    pub base_vat: VatSlot,
    pub shaders: Vec<ShaderRecord>,
    /// Matrix translation table consulted by the preload opcodes.
    pub translations: Vec<Vec3>,
}

/// Owns the pass-local graphics state, the batch cache and the picker
/// registry. Single render thread only.
#[derive(Default)]
pub struct EntityRenderer {
    cache: HashMap<BatchKey, Rc<RenderBatch>>,
    pub picker: PickerRegistry,
    gx: GxState,
    opts: DecodeOptions,
}

impl EntityRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(opts: DecodeOptions) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    /// Fetch the batch for one entity stream, decoding on first use.
    ///
    /// Structural corruption is caught here: the error is logged once
    /// and an empty batch is cached, so the entity renders nothing but
    /// everything else carries on.
    pub fn batch_for(
        &mut self,
        entity: EntityId,
        model: &ModelAssets,
        stream: usize,
        params: RenderParams,
    ) -> Rc<RenderBatch> {
        let key = BatchKey {
            entity,
            stream,
            params,
        };
        if !params.picking {
            if let Some(batch) = self.cache.get(&key) {
                return Rc::clone(batch);
            }
        }

        self.gx.reset();
        let mut batch = RenderBatch::new();
        let interp = SceneInterp {
            model,
            entity,
            stream,
            params,
            opts: self.opts,
        };
        if let Err(e) = interp.run(&mut self.gx, &mut batch, &mut self.picker) {
            log::error!("entity {entity:?} stream {stream}: {e}");
            batch = RenderBatch::new();
        }
        let batch = Rc::new(batch);
        if !params.picking {
            self.cache.insert(key, Rc::clone(&batch));
        }
        batch
    }

    /// Decode (or fetch) and replay one entity stream on the backend.
    pub fn render(
        &mut self,
        entity: EntityId,
        model: &ModelAssets,
        stream: usize,
        params: RenderParams,
        backend: &mut dyn RenderBackend,
    ) -> BatchStats {
        self.batch_for(entity, model, stream, params).execute(backend)
    }

    /// Drop every cached batch belonging to `entity`. Called when the
    /// entity's assets are unloaded.
    pub fn unload(&mut self, entity: EntityId) {
        self.cache.retain(|key, _| key.entity != entity);
    }

    pub fn cached_batches(&self) -> usize {
        self.cache.len()
    }
}
