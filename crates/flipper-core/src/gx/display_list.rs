//! Display-list vertex decoder.
//!
//! A display list is a byte-aligned binary stream of raw primitive-draw
//! commands. Draw opcodes carry the active VAT slot in their low 3 bits
//! and a big-endian 16-bit vertex count; the slot's descriptors then
//! drive the per-vertex decode. Register-load opcodes interleave with
//! draws and mutate the Register File / Transform Memory as side
//! effects, so a list can reconfigure encodings mid-stream.
//!
//! Decoded runs go to a swappable [`VertexSink`]; the render batch is
//! the normal sink, and [`TriangleSink`] flattens everything to plain
//! triangles for the mesh-export path.

use super::fmt::{self, Presence};
use super::regs::{VatRegs, VatSlot};
use super::xf::XfMem;
use crate::error::DecodeError;

// Opcodes. Low 3 bits of a draw opcode select the VAT slot.
pub const OP_NOP: u8 = 0x00;
pub const OP_LOAD_CP: u8 = 0x08;
pub const OP_LOAD_XF: u8 = 0x10;
pub const OP_CALL_DL: u8 = 0x40;
pub const OP_LOAD_BP: u8 = 0x61;
pub const OP_DRAW_QUADS: u8 = 0x80;
pub const OP_DRAW_TRIANGLES: u8 = 0x90;
pub const OP_DRAW_TRIANGLE_STRIP: u8 = 0x98;
pub const OP_DRAW_TRIANGLE_FAN: u8 = 0xA0;
pub const OP_DRAW_LINES: u8 = 0xA8;
pub const OP_DRAW_LINE_STRIP: u8 = 0xB0;
pub const OP_DRAW_POINTS: u8 = 0xB8;

/// Look up a human-readable name for a display-list opcode.
pub fn opcode_name(op: u8) -> &'static str {
    match op {
        OP_NOP => "NOP",
        OP_LOAD_CP => "LOAD_CP_REG",
        OP_LOAD_XF => "LOAD_XF_REG",
        OP_CALL_DL => "CALL_DL",
        OP_LOAD_BP => "LOAD_BP_REG",
        _ => match op & 0xF8 {
            OP_DRAW_QUADS => "DRAW_QUADS",
            OP_DRAW_TRIANGLES => "DRAW_TRIANGLES",
            OP_DRAW_TRIANGLE_STRIP => "DRAW_TRIANGLE_STRIP",
            OP_DRAW_TRIANGLE_FAN => "DRAW_TRIANGLE_FAN",
            OP_DRAW_LINES => "DRAW_LINES",
            OP_DRAW_LINE_STRIP => "DRAW_LINE_STRIP",
            OP_DRAW_POINTS => "DRAW_POINTS",
            _ => "???",
        },
    }
}

/// Primitive topology as submitted to the sink. Quads never reach a
/// sink: the decoder expands them to triangles first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Triangles,
    TriangleStrip,
    TriangleFan,
    Lines,
    LineStrip,
    Points,
}

impl Topology {
    /// Primitives described by `n` vertices of this topology.
    pub fn primitive_count(self, n: usize) -> usize {
        match self {
            Self::Triangles => n / 3,
            Self::TriangleStrip | Self::TriangleFan => n.saturating_sub(2),
            Self::Lines => n / 2,
            Self::LineStrip => n.saturating_sub(1),
            Self::Points => n,
        }
    }
}

/// One fully decoded vertex. Absent attributes hold documented
/// defaults so every vertex is structurally complete: colors default to
/// opaque white (never black or transparent, which would make geometry
/// invisible), normals to +Z, everything else to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub mtx_idx: u8,
    pub pos: [f32; 3],
    pub nrm: [f32; 3],
    pub colors: [[u8; 4]; 2],
    pub tex: [[f32; 2]; 8],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            mtx_idx: 0,
            pos: [0.0; 3],
            nrm: [0.0, 0.0, 1.0],
            colors: [[0xFF; 4]; 2],
            tex: [[0.0; 2]; 8],
        }
    }
}

/// Named attribute source buffers for indexed reads, big-endian,
/// addressed by `index * stride`.
#[derive(Default, Clone, Copy)]
pub struct Arrays<'a> {
    pub pos: &'a [u8],
    pub nrm: &'a [u8],
    pub colors: [&'a [u8]; 2],
    pub tex: [&'a [u8]; 8],
}

/// Decode behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DecodeOptions {
    /// Fail on out-of-range indexed reads instead of the default
    /// log-and-substitute-index-0 recovery.
    pub strict_indexing: bool,
}

/// Where decoded vertex runs go.
pub trait VertexSink {
    fn submit(&mut self, topology: Topology, verts: &[Vertex]);
}

/// Export sink: flattens strips and fans into a plain triangle list.
/// Line and point runs are not surface geometry and are dropped.
#[derive(Default)]
pub struct TriangleSink {
    pub triangles: Vec<[Vertex; 3]>,
}

impl VertexSink for TriangleSink {
    fn submit(&mut self, topology: Topology, verts: &[Vertex]) {
        match topology {
            Topology::Triangles => {
                for t in verts.chunks_exact(3) {
                    self.triangles.push([t[0], t[1], t[2]]);
                }
            }
            Topology::TriangleStrip => {
                for i in 2..verts.len() {
                    // Odd triangles flip winding to keep faces consistent.
                    if i % 2 == 0 {
                        self.triangles.push([verts[i - 2], verts[i - 1], verts[i]]);
                    } else {
                        self.triangles.push([verts[i - 1], verts[i - 2], verts[i]]);
                    }
                }
            }
            Topology::TriangleFan => {
                for i in 2..verts.len() {
                    self.triangles.push([verts[0], verts[i - 1], verts[i]]);
                }
            }
            Topology::Lines | Topology::LineStrip | Topology::Points => {}
        }
    }
}

/// Per-run decode counters, in the spirit of frame stats.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DlStats {
    pub vertices: u32,
    pub draws: u32,
    pub cp_writes: u32,
    pub xf_writes: u32,
}

/// Byte cursor over a display list. All multi-byte reads are
/// big-endian; running past the end is structural corruption.
struct DlReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DlReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.pos + n > self.buf.len() {
            return Err(DecodeError::Truncated { offset: self.pos });
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(self.u32()?))
    }
}

/// Walk a display list, mutating `regs`/`xf` through register-load
/// opcodes and feeding decoded vertex runs to `sink`.
///
/// A "call another list" opcode fails: lists do not recurse here, and
/// an unknown opcode means we have lost framing, so both are structural
/// corruption.
pub fn decode(
    dl: &[u8],
    regs: &mut VatRegs,
    xf: &mut XfMem,
    arrays: &Arrays<'_>,
    sink: &mut dyn VertexSink,
    opts: &DecodeOptions,
) -> Result<DlStats, DecodeError> {
    let mut r = DlReader::new(dl);
    let mut stats = DlStats::default();

    while !r.at_end() {
        let op_offset = r.pos;
        let op = r.u8()?;
        match op {
            OP_NOP => {}
            OP_LOAD_CP => {
                let id = r.u8()?;
                let value = r.u32()?;
                regs.set_reg(id, value);
                stats.cp_writes += 1;
            }
            OP_LOAD_XF => {
                // Header word: (count - 1) in the high half, base
                // register in the low half, then `count` f32 words.
                let header = r.u32()?;
                let count = (header >> 16) + 1;
                let base = (header & 0xFFFF) as usize;
                for i in 0..count as usize {
                    let value = r.f32()?;
                    xf.set_reg(base + i, value)?;
                }
                stats.xf_writes += count;
            }
            OP_LOAD_BP => {
                // Blend-processor state is owned by the scene layer's
                // shader records; accept and ignore the raw write.
                let value = r.u32()?;
                log::trace!("display list BP write {value:#010X} ignored");
            }
            OP_CALL_DL => {
                return Err(DecodeError::NestedCall { offset: op_offset });
            }
            _ => {
                let topology = match op & 0xF8 {
                    OP_DRAW_QUADS => None,
                    OP_DRAW_TRIANGLES => Some(Topology::Triangles),
                    OP_DRAW_TRIANGLE_STRIP => Some(Topology::TriangleStrip),
                    OP_DRAW_TRIANGLE_FAN => Some(Topology::TriangleFan),
                    OP_DRAW_LINES => Some(Topology::Lines),
                    OP_DRAW_LINE_STRIP => Some(Topology::LineStrip),
                    OP_DRAW_POINTS => Some(Topology::Points),
                    _ => {
                        return Err(DecodeError::UnknownOpcode {
                            opcode: op,
                            offset: op_offset,
                        })
                    }
                };
                let slot = *regs.vat((op & 0x7) as usize);
                let count = r.u16()? as usize;
                let mut verts = Vec::with_capacity(count);
                for _ in 0..count {
                    verts.push(decode_vertex(&mut r, &slot, regs, arrays, opts)?);
                }
                stats.vertices += count as u32;
                stats.draws += 1;
                match topology {
                    Some(t) => sink.submit(t, &verts),
                    None => submit_quads(sink, &verts),
                }
            }
        }
    }
    Ok(stats)
}

/// Expand quads to two triangles per four vertices, sharing the
/// `v2 - v0` diagonal: `v0 v1 v2, v2 v3 v0`. A trailing partial quad is
/// malformed data and is dropped with a diagnostic.
fn submit_quads(sink: &mut dyn VertexSink, verts: &[Vertex]) {
    if verts.len() % 4 != 0 {
        log::warn!(
            "quad run of {} vertices, dropping {} trailing",
            verts.len(),
            verts.len() % 4
        );
    }
    let mut out = Vec::with_capacity(verts.len() / 4 * 6);
    for q in verts.chunks_exact(4) {
        out.extend_from_slice(&[q[0], q[1], q[2], q[2], q[3], q[0]]);
    }
    sink.submit(Topology::Triangles, &out);
}

/// Resolve an indexed attribute read to a byte offset into `buf`.
///
/// Out-of-range indices occur routinely in edge-case assets: in the
/// default lenient mode they log and substitute index 0 so the vertex
/// stays structurally complete. `None` means even index 0 has no data
/// and the caller should apply the attribute default.
fn indexed_offset(
    attr: &'static str,
    index: usize,
    stride: usize,
    need: usize,
    buf: &[u8],
    opts: &DecodeOptions,
) -> Result<Option<usize>, DecodeError> {
    if index * stride + need <= buf.len() {
        return Ok(Some(index * stride));
    }
    if opts.strict_indexing {
        return Err(DecodeError::AttrIndexOutOfRange {
            attr,
            index,
            len: buf.len(),
        });
    }
    log::warn!(
        "{attr} index {index} out of range ({} byte array), substituting 0",
        buf.len()
    );
    if need <= buf.len() {
        Ok(Some(0))
    } else {
        Ok(None)
    }
}

/// Read the stream-side index of an indexed attribute. 8-bit indices
/// are never shifted (they are indices, not quantized values).
fn read_index(r: &mut DlReader<'_>, presence: Presence) -> Result<usize, DecodeError> {
    Ok(match presence {
        Presence::Index8 => r.u8()? as usize,
        _ => r.u16()? as usize,
    })
}

/// Decode one vertex in the fixed attribute order: matrix index,
/// position, normal, colors, texcoords.
fn decode_vertex(
    r: &mut DlReader<'_>,
    slot: &VatSlot,
    regs: &VatRegs,
    arrays: &Arrays<'_>,
    opts: &DecodeOptions,
) -> Result<Vertex, DecodeError> {
    let mut v = Vertex::default();

    // Matrix index: direct u8, never shifted.
    if slot.has_mtx_idx {
        v.mtx_idx = r.u8()?;
    }

    // Position: 2 or 3 components.
    let n = slot.pos.count.clamp(2, 3) as usize;
    match slot.pos.presence {
        Presence::None => {}
        Presence::Direct => {
            for c in 0..n {
                let b = r.take(slot.pos.fmt.size())?;
                v.pos[c] = fmt::read_component(b, 0, slot.pos.fmt, slot.pos.shift);
            }
        }
        p => {
            let index = read_index(r, p)?;
            let stride = regs.stride(0) as usize;
            let need = n * slot.pos.fmt.size();
            if let Some(off) = indexed_offset("position", index, stride, need, arrays.pos, opts)? {
                for c in 0..n {
                    v.pos[c] = fmt::read_component(
                        arrays.pos,
                        off + c * slot.pos.fmt.size(),
                        slot.pos.fmt,
                        slot.pos.shift,
                    );
                }
            }
        }
    }

    // Normal: 3 components, format-fixed divisor, never unsigned.
    match slot.nrm.presence {
        Presence::None => {}
        Presence::Direct => {
            for c in 0..3 {
                let b = r.take(slot.nrm.fmt.size())?;
                v.nrm[c] = fmt::read_normal_component(b, 0, slot.nrm.fmt);
            }
        }
        p => {
            let index = read_index(r, p)?;
            let stride = regs.stride(1) as usize;
            let need = 3 * slot.nrm.fmt.size();
            if let Some(off) = indexed_offset("normal", index, stride, need, arrays.nrm, opts)? {
                for c in 0..3 {
                    v.nrm[c] = fmt::read_normal_component(
                        arrays.nrm,
                        off + c * slot.nrm.fmt.size(),
                        slot.nrm.fmt,
                    );
                }
            }
        }
    }

    // Colors: packed formats, absent channels already default white.
    for ci in 0..2 {
        let desc = slot.colors[ci];
        match desc.presence {
            Presence::None => {}
            Presence::Direct => {
                let b = r.take(desc.fmt.size())?;
                v.colors[ci] = fmt::read_color(b, 0, desc.fmt);
            }
            p => {
                let index = read_index(r, p)?;
                let stride = regs.stride(2 + ci) as usize;
                let buf = arrays.colors[ci];
                if let Some(off) =
                    indexed_offset("color", index, stride, desc.fmt.size(), buf, opts)?
                {
                    v.colors[ci] = fmt::read_color(buf, off, desc.fmt);
                }
            }
        }
    }

    // Texcoords: 1 or 2 components each.
    for ti in 0..8 {
        let desc = slot.tex[ti];
        let n = desc.count.clamp(1, 2) as usize;
        match desc.presence {
            Presence::None => {}
            Presence::Direct => {
                for c in 0..n {
                    let b = r.take(desc.fmt.size())?;
                    v.tex[ti][c] = fmt::read_component(b, 0, desc.fmt, desc.shift);
                }
            }
            p => {
                let index = read_index(r, p)?;
                let stride = regs.stride(4 + ti) as usize;
                let buf = arrays.tex[ti];
                let need = n * desc.fmt.size();
                if let Some(off) = indexed_offset("texcoord", index, stride, need, buf, opts)? {
                    for c in 0..n {
                        v.tex[ti][c] =
                            fmt::read_component(buf, off + c * desc.fmt.size(), desc.fmt, desc.shift);
                    }
                }
            }
        }
    }

    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gx::fmt::{ColorFormat, CompFormat};
    use crate::gx::regs::{ColorAttr, VecAttr};

    /// Route decoder diagnostics through env_logger (visible with
    /// `RUST_LOG=warn` on a failing test).
    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Records every submitted run for inspection.
    #[derive(Default)]
    struct CollectSink {
        runs: Vec<(Topology, Vec<Vertex>)>,
    }

    impl VertexSink for CollectSink {
        fn submit(&mut self, topology: Topology, verts: &[Vertex]) {
            self.runs.push((topology, verts.to_vec()));
        }
    }

    fn pos_s16_slot() -> VatSlot {
        VatSlot {
            pos: VecAttr {
                presence: Presence::Direct,
                fmt: CompFormat::S16,
                count: 3,
                shift: 0,
            },
            ..VatSlot::default()
        }
    }

    fn setup(slot: &VatSlot) -> (VatRegs, XfMem) {
        let mut regs = VatRegs::new();
        regs.set_vat_format(0, slot);
        (regs, XfMem::new())
    }

    fn draw(op: u8, verts: &[[i16; 3]]) -> Vec<u8> {
        let mut dl = vec![op];
        dl.extend_from_slice(&(verts.len() as u16).to_be_bytes());
        for v in verts {
            for c in v {
                dl.extend_from_slice(&c.to_be_bytes());
            }
        }
        dl
    }

    #[test]
    fn triangles_decode_exact_positions() {
        let (mut regs, mut xf) = setup(&pos_s16_slot());
        let dl = draw(OP_DRAW_TRIANGLES, &[[0, 0, 0], [100, 0, 0], [0, 100, 0]]);
        let mut sink = CollectSink::default();
        let stats = decode(
            &dl,
            &mut regs,
            &mut xf,
            &Arrays::default(),
            &mut sink,
            &DecodeOptions::default(),
        )
        .unwrap();

        assert_eq!(stats.vertices, 3);
        let (topo, verts) = &sink.runs[0];
        assert_eq!(*topo, Topology::Triangles);
        assert_eq!(verts[0].pos, [0.0, 0.0, 0.0]);
        assert_eq!(verts[1].pos, [100.0, 0.0, 0.0]);
        assert_eq!(verts[2].pos, [0.0, 100.0, 0.0]);
        // Defaults applied for everything the VAT leaves out.
        assert_eq!(verts[0].colors[0], [0xFF; 4]);
        assert_eq!(verts[0].tex[0], [0.0, 0.0]);
    }

    #[test]
    fn quads_expand_to_shared_diagonal_triangles() {
        let (mut regs, mut xf) = setup(&pos_s16_slot());
        let quads: Vec<[i16; 3]> = (0..8).map(|i| [i, 0, 0]).collect();
        let dl = draw(OP_DRAW_QUADS, &quads);
        let mut sink = CollectSink::default();
        decode(
            &dl,
            &mut regs,
            &mut xf,
            &Arrays::default(),
            &mut sink,
            &DecodeOptions::default(),
        )
        .unwrap();

        let (topo, verts) = &sink.runs[0];
        assert_eq!(*topo, Topology::Triangles);
        // 2 quads -> 12 triangle-list vertices.
        assert_eq!(verts.len(), 12);
        for q in 0..2 {
            let t = &verts[q * 6..q * 6 + 6];
            // v0 v1 v2, v2 v3 v0: diagonal v2-v0 shared by both halves.
            assert_eq!(t[2], t[3]);
            assert_eq!(t[0], t[5]);
        }
        assert_eq!(verts[0].pos[0], 0.0);
        assert_eq!(verts[1].pos[0], 1.0);
        assert_eq!(verts[2].pos[0], 2.0);
    }

    #[test]
    fn partial_quad_run_drops_trailing_vertices() {
        init_logs();
        let (mut regs, mut xf) = setup(&pos_s16_slot());
        // 7 vertices: one whole quad plus 3 trailing.
        let verts: Vec<[i16; 3]> = (0..7).map(|i| [i, 0, 0]).collect();
        let dl = draw(OP_DRAW_QUADS, &verts);
        let mut sink = CollectSink::default();
        decode(
            &dl,
            &mut regs,
            &mut xf,
            &Arrays::default(),
            &mut sink,
            &DecodeOptions::default(),
        )
        .unwrap();
        let (_, out) = &sink.runs[0];
        assert_eq!(out.len(), 6);
        assert_eq!(out[5].pos[0], 0.0); // v0 closes the only quad
    }

    #[test]
    fn indexed_read_out_of_range_substitutes_zero() {
        init_logs();
        let mut slot = pos_s16_slot();
        slot.pos.presence = Presence::Index8;
        let (mut regs, mut xf) = setup(&slot);
        regs.set_stride(0, 6);

        // Source holds exactly one vertex; index 9 is out of range.
        let mut pos = Vec::new();
        for c in [7i16, 8, 9] {
            pos.extend_from_slice(&c.to_be_bytes());
        }
        let arrays = Arrays {
            pos: &pos,
            ..Arrays::default()
        };

        let dl = vec![OP_DRAW_POINTS, 0, 1, 9];
        let mut sink = CollectSink::default();
        decode(
            &dl,
            &mut regs,
            &mut xf,
            &arrays,
            &mut sink,
            &DecodeOptions::default(),
        )
        .unwrap();
        assert_eq!(sink.runs[0].1[0].pos, [7.0, 8.0, 9.0]);

        // Strict mode refuses instead.
        let mut sink = CollectSink::default();
        let err = decode(
            &dl,
            &mut regs,
            &mut xf,
            &arrays,
            &mut sink,
            &DecodeOptions {
                strict_indexing: true,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::AttrIndexOutOfRange { index: 9, .. }));
    }

    #[test]
    fn register_loads_interleave_with_draws() {
        let (mut regs, mut xf) = setup(&pos_s16_slot());
        let mut dl = Vec::new();
        // Re-point VAT slot 0 position shift via a CP write, then draw.
        let mut shifted = pos_s16_slot();
        shifted.pos.shift = 1;
        let mut scratch = VatRegs::new();
        scratch.set_vat_format(0, &shifted);
        dl.push(OP_LOAD_CP);
        dl.push(0x70);
        dl.extend_from_slice(&scratch.reg(0x70).to_be_bytes());
        dl.extend_from_slice(&draw(OP_DRAW_POINTS, &[[25, 0, 0]]));

        let mut sink = CollectSink::default();
        let stats = decode(
            &dl,
            &mut regs,
            &mut xf,
            &Arrays::default(),
            &mut sink,
            &DecodeOptions::default(),
        )
        .unwrap();
        assert_eq!(stats.cp_writes, 1);
        assert_eq!(sink.runs[0].1[0].pos, [12.5, 0.0, 0.0]);
    }

    #[test]
    fn xf_load_writes_matrix_words() {
        let (mut regs, mut xf) = setup(&pos_s16_slot());
        // Load 4 words at register 0: first row of position slot 0.
        let mut dl = vec![OP_LOAD_XF];
        dl.extend_from_slice(&((3u32 << 16) | 0).to_be_bytes());
        for v in [1.0f32, 0.0, 0.0, 5.0] {
            dl.extend_from_slice(&v.to_be_bytes());
        }
        let mut sink = CollectSink::default();
        decode(
            &dl,
            &mut regs,
            &mut xf,
            &Arrays::default(),
            &mut sink,
            &DecodeOptions::default(),
        )
        .unwrap();
        assert_eq!(xf.pos_mtx(0).col(3).x, 5.0);
    }

    #[test]
    fn nested_call_is_structural_corruption() {
        let (mut regs, mut xf) = setup(&pos_s16_slot());
        let mut sink = CollectSink::default();
        let err = decode(
            &[OP_CALL_DL, 0, 0, 0, 0],
            &mut regs,
            &mut xf,
            &Arrays::default(),
            &mut sink,
            &DecodeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::NestedCall { offset: 0 }));
    }

    #[test]
    fn unknown_opcode_fails() {
        let (mut regs, mut xf) = setup(&pos_s16_slot());
        let mut sink = CollectSink::default();
        let err = decode(
            &[0x71],
            &mut regs,
            &mut xf,
            &Arrays::default(),
            &mut sink,
            &DecodeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnknownOpcode { opcode: 0x71, .. }));
    }

    #[test]
    fn triangle_sink_flattens_strips_and_fans() {
        let v = |x: f32| Vertex {
            pos: [x, 0.0, 0.0],
            ..Vertex::default()
        };
        let mut sink = TriangleSink::default();
        sink.submit(Topology::TriangleStrip, &[v(0.0), v(1.0), v(2.0), v(3.0)]);
        assert_eq!(sink.triangles.len(), 2);
        // Second strip triangle flips winding.
        assert_eq!(sink.triangles[1][0].pos[0], 2.0);
        assert_eq!(sink.triangles[1][1].pos[0], 1.0);

        let mut sink = TriangleSink::default();
        sink.submit(Topology::TriangleFan, &[v(0.0), v(1.0), v(2.0), v(3.0)]);
        assert_eq!(sink.triangles.len(), 2);
        assert_eq!(sink.triangles[1][0].pos[0], 0.0);
    }

    #[test]
    fn colors_decode_from_packed_direct_data() {
        let mut slot = VatSlot::default();
        slot.colors[0] = ColorAttr {
            presence: Presence::Direct,
            fmt: ColorFormat::Rgb565,
        };
        let (mut regs, mut xf) = setup(&slot);
        let mut dl = vec![OP_DRAW_POINTS, 0, 1];
        dl.extend_from_slice(&0xF800u16.to_be_bytes()); // pure red
        let mut sink = CollectSink::default();
        decode(
            &dl,
            &mut regs,
            &mut xf,
            &Arrays::default(),
            &mut sink,
            &DecodeOptions::default(),
        )
        .unwrap();
        assert_eq!(sink.runs[0].1[0].colors[0], [0xFF, 0, 0, 0xFF]);
    }
}
