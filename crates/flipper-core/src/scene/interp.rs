//! Scene bytecode interpreter.
//!
//! Entity visuals are composed by a bit-packed bytecode sitting above
//! the display lists: 4-bit opcodes with variable-width operands select
//! shaders, choose vertex index widths, preload placement matrices and
//! call into display lists. Nothing here is byte-aligned, so the
//! cursor is a [`BitReader`] threaded explicitly through the decode.
//!
//! Two failure regimes apply. Losing framing (an opcode outside the
//! known set, a list index past the table) is structural corruption and
//! aborts the stream with an error. Running out of bits mid-operand is
//! common in real assets (streams are not length-prefixed and trailing
//! padding varies) and just ends the stream with a diagnostic.

use glam::{Mat4, Vec3};

use crate::error::DecodeError;
use crate::gx::display_list::{self, DecodeOptions};
use crate::gx::fmt::Presence;
use crate::gx::GxState;
use crate::render::batch::{RenderBatch, StateChange};
use crate::render::picker::{PickerObject, PickerRegistry};
use crate::scene::bits::BitReader;
use crate::scene::entity::{EntityId, EntityKind, ModelAssets, RenderParams};
use crate::scene::shader::{ShaderRecord, MAX_TEX_UNITS};

pub const OP_LOAD_MTX_A: u8 = 0x0;
pub const OP_SELECT_SHADER: u8 = 0x1;
pub const OP_CALL_LIST: u8 = 0x2;
pub const OP_SET_FORMAT: u8 = 0x3;
pub const OP_LOAD_MTX_B: u8 = 0x4;
pub const OP_END: u8 = 0x5;

pub fn scene_opcode_name(op: u8) -> &'static str {
    match op {
        OP_LOAD_MTX_A => "LOAD_MTX_A",
        OP_SELECT_SHADER => "SELECT_SHADER",
        OP_CALL_LIST => "CALL_LIST",
        OP_SET_FORMAT => "SET_FORMAT",
        OP_LOAD_MTX_B => "LOAD_MTX_B",
        OP_END => "END",
        _ => "???",
    }
}

/// One interpreter run: an entity's instruction stream decoded into a
/// render batch, against pass-local register/transform state.
pub struct SceneInterp<'a> {
    pub model: &'a ModelAssets,
    pub entity: EntityId,
    pub stream: usize,
    pub params: RenderParams,
    pub opts: DecodeOptions,
}

impl<'a> SceneInterp<'a> {
    /// Interpret the stream to completion, appending to `batch`.
    ///
    /// `gx` is seeded from the model (strides and base vertex format)
    /// before the first opcode; the caller only needs to have reset it.
    pub fn run(
        &self,
        gx: &mut GxState,
        batch: &mut RenderBatch,
        picker: &mut PickerRegistry,
    ) -> Result<(), DecodeError> {
        let buf = match self.model.streams.get(self.stream) {
            Some(buf) => buf.as_slice(),
            None => {
                return Err(DecodeError::ListIndexOutOfRange {
                    index: self.stream,
                    count: self.model.streams.len(),
                })
            }
        };
        for (attr, &stride) in self.model.strides.iter().enumerate() {
            gx.regs.set_stride(attr, stride);
        }
        gx.regs.set_vat_format(0, &self.model.base_vat);

        // Stream exhaustion mid-operand ends the run cleanly; only a
        // full 4-bit opcode read returning nothing is the normal end.
        macro_rules! operand {
            ($r:expr, $n:expr) => {
                match $r.read($n) {
                    Some(v) => v,
                    None => {
                        log::warn!(
                            "scene stream {} exhausted mid-operand at bit {}",
                            self.stream,
                            $r.bit_pos()
                        );
                        return Ok(());
                    }
                }
            };
        }

        let mut r = BitReader::new(buf);
        loop {
            let op_bit = r.bit_pos();
            let op = match r.read(4) {
                Some(op) => op as u8,
                None => {
                    log::warn!("scene stream {} ended without END opcode", self.stream);
                    return Ok(());
                }
            };
            match op {
                OP_END => return Ok(()),
                OP_SELECT_SHADER => {
                    let idx = operand!(r, 6) as u8;
                    self.select_shader(idx, gx, batch);
                }
                OP_SET_FORMAT => {
                    let shader = self.current_shader(gx);
                    let mut slot = self.model.base_vat;
                    let width = |bit: u32| {
                        if bit == 0 {
                            Presence::Index8
                        } else {
                            Presence::Index16
                        }
                    };
                    slot.pos.presence = width(operand!(r, 1));
                    if shader.map_or(false, |s| s.has_normals) {
                        slot.nrm.presence = width(operand!(r, 1));
                    } else {
                        slot.nrm.presence = Presence::None;
                    }
                    if shader.map_or(false, |s| s.has_colors) {
                        slot.colors[0].presence = width(operand!(r, 1));
                    } else {
                        slot.colors[0].presence = Presence::None;
                    }
                    slot.colors[1].presence = Presence::None;
                    // One width bit covers every active texture layer.
                    let layers = shader.map_or(0, |s| s.layer_count as usize).min(MAX_TEX_UNITS);
                    if layers > 0 {
                        let w = width(operand!(r, 1));
                        for (unit, tex) in slot.tex.iter_mut().enumerate() {
                            tex.presence = if unit < layers { w } else { Presence::None };
                        }
                    } else {
                        for tex in &mut slot.tex {
                            tex.presence = Presence::None;
                        }
                    }
                    gx.regs.set_vat_format(0, &slot);
                }
                OP_CALL_LIST => {
                    let index = operand!(r, 8) as usize;
                    if index >= self.model.display_lists.len() {
                        return Err(DecodeError::ListIndexOutOfRange {
                            index,
                            count: self.model.display_lists.len(),
                        });
                    }
                    if !self.params.show_hidden
                        && self.current_shader(gx).map_or(false, ShaderRecord::is_hidden)
                    {
                        log::debug!("display list {index} skipped (hidden shader)");
                        continue;
                    }
                    if self.params.picking {
                        let id = picker.register(PickerObject {
                            entity: self.entity,
                            stream: self.stream,
                            list: index,
                        });
                        batch.add_state(StateChange::Picker(id));
                    }
                    let arrays = self.model.buffers.as_arrays();
                    let stats = display_list::decode(
                        &self.model.display_lists[index],
                        &mut gx.regs,
                        &mut gx.xf,
                        &arrays,
                        batch,
                        &self.opts,
                    )?;
                    log::trace!(
                        "display list {index}: {} vertices, {} draws",
                        stats.vertices,
                        stats.draws
                    );
                }
                OP_LOAD_MTX_A | OP_LOAD_MTX_B => {
                    let count = operand!(r, 8) as usize;
                    for i in 0..count {
                        let index = operand!(r, 8) as usize;
                        // Map cells have placement baked into their
                        // geometry; the indices still occupy the stream.
                        if self.model.kind == EntityKind::MapCell {
                            continue;
                        }
                        let t = match self.model.translations.get(index) {
                            Some(t) => *t,
                            None => {
                                log::warn!(
                                    "matrix translation {index} missing, placing at origin"
                                );
                                Vec3::ZERO
                            }
                        };
                        // The hardware reserves two slots per decade of
                        // the position bank; keep its layout exactly.
                        let slot = i + 2 * (i / 10);
                        gx.xf.set_mtx(slot, &Mat4::from_translation(t));
                    }
                }
                _ => {
                    return Err(DecodeError::UnknownSceneOpcode {
                        opcode: op,
                        bit: op_bit,
                    })
                }
            }
        }
    }

    fn current_shader(&self, gx: &GxState) -> Option<&'a ShaderRecord> {
        gx.current_shader
            .and_then(|idx| self.model.shaders.get(idx as usize))
    }

    /// Shader state changes are expensive on the host; reselecting the
    /// current shader must emit nothing.
    fn select_shader(&self, idx: u8, gx: &mut GxState, batch: &mut RenderBatch) {
        if gx.current_shader == Some(idx) {
            return;
        }
        gx.current_shader = Some(idx);
        let fallback;
        let record = match self.model.shaders.get(idx as usize) {
            Some(record) => record,
            None => {
                log::warn!("shader {idx} missing from table, using default state");
                fallback = ShaderRecord::default();
                &fallback
            }
        };
        batch.add_state(StateChange::Pipeline(record.pipeline_state()));
        for unit in 0..MAX_TEX_UNITS {
            batch.add_state(StateChange::BindTexture {
                unit: unit as u8,
                binding: record.binding(unit),
            });
        }
    }
}
