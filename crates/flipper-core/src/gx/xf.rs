//! Transform Memory: the indexed matrix bank consulted by matrix-index
//! vertex attributes.
//!
//! The hardware stores position matrices as 4x3 (three rows of four
//! floats, row-major, so the column-major game matrix lands transposed)
//! and normal matrices as 3x3, all in one flat register file of f32
//! words. Slot `idx` of the position bank occupies rows `idx*4` through
//! `idx*4+2`; the fourth row of each slot is reserved. We keep the flat
//! words and rebuild padded `Mat4`s on read.
//!
//! Decoded streams routinely reference slots before anything was loaded
//! into them, so reads of never-populated slots degrade gracefully:
//! identity plus a diagnostic, never an error. Writes are stricter:
//! a NaN or infinity here would silently break every later draw, so
//! `set_reg` rejects non-finite values outright.

use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::error::XfError;

pub const POS_MTX_SLOTS: usize = 64;
pub const NRM_MTX_SLOTS: usize = 32;

/// Flat f32 register count: 64 position slots of 4 rows x 4 floats,
/// then 32 normal slots of 3 rows x 3 floats.
const POS_WORDS: usize = POS_MTX_SLOTS * 16;
const NRM_WORDS: usize = NRM_MTX_SLOTS * 9;

pub struct XfMem {
    words: Vec<f32>,
    pos_loaded: u64,
    nrm_loaded: u32,
}

impl Default for XfMem {
    fn default() -> Self {
        Self::new()
    }
}

impl XfMem {
    pub fn new() -> Self {
        let mut xf = Self {
            words: vec![0.0; POS_WORDS + NRM_WORDS],
            pos_loaded: 0,
            nrm_loaded: 0,
        };
        xf.write_identities();
        xf
    }

    /// Reinitialize every slot to identity and mark all slots
    /// never-populated.
    pub fn reset(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0.0);
        self.write_identities();
        self.pos_loaded = 0;
        self.nrm_loaded = 0;
    }

    fn write_identities(&mut self) {
        for slot in 0..POS_MTX_SLOTS {
            for r in 0..3 {
                self.words[slot * 16 + r * 4 + r] = 1.0;
            }
        }
        for slot in 0..NRM_MTX_SLOTS {
            for r in 0..3 {
                self.words[POS_WORDS + slot * 9 + r * 3 + r] = 1.0;
            }
        }
    }

    /// Raw register write, the side effect of an XF load opcode in a
    /// display list. Rejects non-finite values before they can reach
    /// shared state; out-of-range registers are ignored with a
    /// diagnostic (the hardware ignores them too).
    pub fn set_reg(&mut self, reg: usize, value: f32) -> Result<(), XfError> {
        if !value.is_finite() {
            return Err(XfError::NonFinite { reg, value });
        }
        if reg >= self.words.len() {
            log::warn!("XF register write {reg:#X} out of range, ignored");
            return Ok(());
        }
        self.words[reg] = value;
        if reg < POS_WORDS {
            self.pos_loaded |= 1 << (reg / 16);
        } else {
            self.nrm_loaded |= 1 << ((reg - POS_WORDS) / 9);
        }
        Ok(())
    }

    /// Write a position matrix at `idx * 4` rows. The matrix is stored
    /// transposed (rows of the column-major source), matching the
    /// hardware 4x3 layout.
    pub fn set_mtx(&mut self, idx: usize, m: &Mat4) {
        if idx >= POS_MTX_SLOTS {
            log::warn!("position matrix slot {idx} out of range, ignored");
            return;
        }
        let base = idx * 16;
        for r in 0..3 {
            let row = m.row(r);
            self.words[base + r * 4..base + r * 4 + 4].copy_from_slice(&row.to_array());
        }
        self.pos_loaded |= 1 << idx;
    }

    /// Write a normal matrix (3x3, transposed like `set_mtx`).
    pub fn set_nrm_mtx(&mut self, idx: usize, m: &Mat3) {
        if idx >= NRM_MTX_SLOTS {
            log::warn!("normal matrix slot {idx} out of range, ignored");
            return;
        }
        let base = POS_WORDS + idx * 9;
        let t = m.transpose();
        self.words[base..base + 9].copy_from_slice(&t.to_cols_array());
        self.nrm_loaded |= 1 << idx;
    }

    /// Read back a position matrix, padded to 4x4. Never-populated
    /// slots return identity with a diagnostic so that rendering can
    /// continue.
    pub fn pos_mtx(&self, idx: usize) -> Mat4 {
        if idx >= POS_MTX_SLOTS || self.pos_loaded & (1 << idx) == 0 {
            log::warn!("position matrix slot {idx} never populated, using identity");
            return Mat4::IDENTITY;
        }
        let base = idx * 16;
        let row = |r: usize| Vec4::from_slice(&self.words[base + r * 4..base + r * 4 + 4]);
        Mat4::from_cols(row(0), row(1), row(2), Vec4::new(0.0, 0.0, 0.0, 1.0)).transpose()
    }

    /// Read back a normal matrix. Same graceful-identity policy.
    pub fn nrm_mtx(&self, idx: usize) -> Mat3 {
        if idx >= NRM_MTX_SLOTS || self.nrm_loaded & (1 << idx) == 0 {
            log::warn!("normal matrix slot {idx} never populated, using identity");
            return Mat3::IDENTITY;
        }
        let base = POS_WORDS + idx * 9;
        let m = Mat3::from_cols(
            Vec3::from_slice(&self.words[base..base + 3]),
            Vec3::from_slice(&self.words[base + 3..base + 6]),
            Vec3::from_slice(&self.words[base + 6..base + 9]),
        );
        m.transpose()
    }

    pub fn is_pos_loaded(&self, idx: usize) -> bool {
        idx < POS_MTX_SLOTS && self.pos_loaded & (1 << idx) != 0
    }
}
