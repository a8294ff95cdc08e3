//! Register File: current vertex-attribute-table configuration and
//! per-attribute array strides.
//!
//! Two write paths exist, matching how the hardware is driven:
//!
//! - `set_reg(id, value)`: raw register write, the side effect of a
//!   register-load opcode inside a display list. Overwrites
//!   unconditionally with no validation; callers must write only
//!   well-formed values, and an out-of-range id is a caller error.
//! - `set_vat_format(slot, descriptor)`: structured write used by the
//!   scene interpreter's change-vertex-format opcode. Fans the
//!   descriptor into the packed register words so that both views stay
//!   coherent.
//!
//! Register map (one 32-bit word each):
//!
//! | id            | contents                                          |
//! |---------------|---------------------------------------------------|
//! | 0x70 + slot   | VAT A: position desc [13:0], normal desc [27:14], |
//! |               |        matrix-index presence bit [28]             |
//! | 0x80 + slot   | VAT B: color0 [4:0], color1 [9:5], tex0 [23:10]   |
//! | 0x90 + slot   | VAT C: shared descriptor for tex1-7 [13:0]        |
//! | 0xA0 + attr   | array stride in bytes (attr: 0 pos, 1 nrm,        |
//! |               |        2-3 color0/1, 4-11 tex0-7)                 |
//!
//! A vector descriptor packs as presence[1:0] | format[4:2] |
//! count[8:5] | shift[13:9]. A color descriptor packs as
//! presence[1:0] | format[4:2].

use super::fmt::{ColorFormat, CompFormat, Presence};

pub const NUM_VAT_SLOTS: usize = 8;
pub const NUM_TEX_COORDS: usize = 8;
pub const NUM_COLORS: usize = 2;

pub const REG_VAT_A: u8 = 0x70;
pub const REG_VAT_B: u8 = 0x80;
pub const REG_VAT_C: u8 = 0x90;
pub const REG_STRIDE: u8 = 0xA0;

/// Attribute indices for the stride table, in decode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum ArrayAttr {
    Pos = 0,
    Nrm = 1,
    Color0 = 2,
    Color1 = 3,
    Tex0 = 4,
}

pub const NUM_ARRAYS: usize = 12;

/// Encoding of one vector attribute (position, normal, texcoord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VecAttr {
    pub presence: Presence,
    pub fmt: CompFormat,
    pub count: u8,
    /// Fixed-point shift; only meaningful for integer formats.
    pub shift: u8,
}

impl VecAttr {
    pub const ABSENT: Self = Self {
        presence: Presence::None,
        fmt: CompFormat::S16,
        count: 0,
        shift: 0,
    };

    fn pack(self) -> u32 {
        (self.presence as u32)
            | ((self.fmt as u32) << 2)
            | ((self.count as u32 & 0xF) << 5)
            | ((self.shift as u32 & 0x1F) << 9)
    }

    fn unpack(bits: u32) -> Self {
        Self {
            presence: Presence::from_bits(bits),
            fmt: CompFormat::from_bits(bits >> 2),
            count: ((bits >> 5) & 0xF) as u8,
            shift: ((bits >> 9) & 0x1F) as u8,
        }
    }
}

/// Encoding of one color attribute. Colors have no shift; the packed
/// format fixes the bit layout entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorAttr {
    pub presence: Presence,
    pub fmt: ColorFormat,
}

impl ColorAttr {
    fn pack(self) -> u32 {
        (self.presence as u32) | ((self.fmt as u32) << 2)
    }

    fn unpack(bits: u32) -> Self {
        Self {
            presence: Presence::from_bits(bits),
            fmt: ColorFormat::from_bits(bits >> 2),
        }
    }
}

/// One VAT slot: the complete per-attribute encoding description used
/// by draw opcodes that select this slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VatSlot {
    /// Position/normal matrix index present as a direct u8 (never
    /// shifted, never indexed).
    pub has_mtx_idx: bool,
    pub pos: VecAttr,
    pub nrm: VecAttr,
    pub colors: [ColorAttr; NUM_COLORS],
    pub tex: [VecAttr; NUM_TEX_COORDS],
}

/// The flat, indexable register store plus its decoded VAT view.
pub struct VatRegs {
    raw: [u32; 0x100],
    vat: [VatSlot; NUM_VAT_SLOTS],
    strides: [u16; NUM_ARRAYS],
}

impl Default for VatRegs {
    fn default() -> Self {
        Self::new()
    }
}

impl VatRegs {
    pub fn new() -> Self {
        Self {
            raw: [0; 0x100],
            vat: [VatSlot::default(); NUM_VAT_SLOTS],
            strides: [0; NUM_ARRAYS],
        }
    }

    /// Power-on state, applied at each render-pass start.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Raw register write. Overwrites unconditionally; VAT and stride
    /// words are re-decoded into the structured view.
    pub fn set_reg(&mut self, id: u8, value: u32) {
        self.raw[id as usize] = value;
        match id {
            _ if (REG_VAT_A..REG_VAT_A + 8).contains(&id) => {
                let slot = &mut self.vat[(id - REG_VAT_A) as usize];
                slot.pos = VecAttr::unpack(value);
                slot.nrm = VecAttr::unpack(value >> 14);
                slot.has_mtx_idx = value & (1 << 28) != 0;
            }
            _ if (REG_VAT_B..REG_VAT_B + 8).contains(&id) => {
                let slot = &mut self.vat[(id - REG_VAT_B) as usize];
                slot.colors[0] = ColorAttr::unpack(value);
                slot.colors[1] = ColorAttr::unpack(value >> 5);
                slot.tex[0] = VecAttr::unpack(value >> 10);
            }
            _ if (REG_VAT_C..REG_VAT_C + 8).contains(&id) => {
                let slot = &mut self.vat[(id - REG_VAT_C) as usize];
                let desc = VecAttr::unpack(value);
                for t in &mut slot.tex[1..] {
                    *t = desc;
                }
            }
            _ if (REG_STRIDE..REG_STRIDE + NUM_ARRAYS as u8).contains(&id) => {
                self.strides[(id - REG_STRIDE) as usize] = value as u16;
            }
            _ => {}
        }
    }

    pub fn reg(&self, id: u8) -> u32 {
        self.raw[id as usize]
    }

    /// Structured VAT write: fans the descriptor into the packed
    /// register words, so a later `reg()` read observes it.
    pub fn set_vat_format(&mut self, slot: usize, desc: &VatSlot) {
        let a = desc.pos.pack()
            | (desc.nrm.pack() << 14)
            | if desc.has_mtx_idx { 1 << 28 } else { 0 };
        let b = desc.colors[0].pack() | (desc.colors[1].pack() << 5) | (desc.tex[0].pack() << 10);
        let c = desc.tex[1].pack();
        self.set_reg(REG_VAT_A + slot as u8, a);
        self.set_reg(REG_VAT_B + slot as u8, b);
        self.set_reg(REG_VAT_C + slot as u8, c);
        // Tex2-7 share the VAT C descriptor in register form; keep the
        // caller's exact per-coord descriptors in the structured view.
        self.vat[slot].tex = desc.tex;
    }

    pub fn vat(&self, slot: usize) -> &VatSlot {
        &self.vat[slot]
    }

    pub fn stride(&self, attr: usize) -> u16 {
        self.strides[attr]
    }

    pub fn set_stride(&mut self, attr: usize, stride: u16) {
        self.set_reg(REG_STRIDE + attr as u8, stride as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slot() -> VatSlot {
        VatSlot {
            has_mtx_idx: true,
            pos: VecAttr {
                presence: Presence::Index16,
                fmt: CompFormat::S16,
                count: 3,
                shift: 8,
            },
            nrm: VecAttr {
                presence: Presence::Index8,
                fmt: CompFormat::S8,
                count: 3,
                shift: 0,
            },
            colors: [
                ColorAttr {
                    presence: Presence::Direct,
                    fmt: ColorFormat::Rgba4444,
                },
                ColorAttr::default(),
            ],
            tex: {
                let mut tex = [VecAttr::ABSENT; NUM_TEX_COORDS];
                tex[0] = VecAttr {
                    presence: Presence::Index16,
                    fmt: CompFormat::S16,
                    count: 2,
                    shift: 10,
                };
                tex[1] = tex[0];
                tex
            },
        }
    }

    #[test]
    fn structured_write_round_trips_through_registers() {
        let mut regs = VatRegs::new();
        let slot = sample_slot();
        regs.set_vat_format(3, &slot);
        assert_eq!(*regs.vat(3), slot);

        // Writing the same raw words into another slot reproduces the
        // descriptor (tex2-7 inherit the shared VAT C word).
        let mut other = VatRegs::new();
        other.set_reg(REG_VAT_A + 5, regs.reg(REG_VAT_A + 3));
        other.set_reg(REG_VAT_B + 5, regs.reg(REG_VAT_B + 3));
        other.set_reg(REG_VAT_C + 5, regs.reg(REG_VAT_C + 3));
        let got = other.vat(5);
        assert_eq!(got.pos, slot.pos);
        assert_eq!(got.nrm, slot.nrm);
        assert_eq!(got.colors, slot.colors);
        assert_eq!(got.tex[0], slot.tex[0]);
        assert_eq!(got.tex[1], slot.tex[1]);
        assert!(got.has_mtx_idx);
    }

    #[test]
    fn set_reg_overwrites_unconditionally() {
        let mut regs = VatRegs::new();
        regs.set_reg(0x42, 0xDEAD_BEEF);
        regs.set_reg(0x42, 7);
        assert_eq!(regs.reg(0x42), 7);
    }

    #[test]
    fn strides_live_in_the_register_file() {
        let mut regs = VatRegs::new();
        regs.set_stride(ArrayAttr::Pos as usize, 6);
        regs.set_reg(REG_STRIDE + 4, 8); // tex0 via raw write
        assert_eq!(regs.stride(0), 6);
        assert_eq!(regs.stride(4), 8);
        regs.reset();
        assert_eq!(regs.stride(0), 0);
    }
}
