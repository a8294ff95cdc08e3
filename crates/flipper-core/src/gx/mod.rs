//! The simulated GPU front end: register file, transform memory, and
//! the byte-aligned display-list vertex decoder.

pub mod display_list;
pub mod fmt;
pub mod regs;
pub mod xf;

use regs::VatRegs;
use xf::XfMem;

/// The mutable graphics state owned by one render pass. Reset between
/// entities; never shared, so no synchronization is needed.
pub struct GxState {
    pub regs: VatRegs,
    pub xf: XfMem,
    /// Last shader index selected by the scene interpreter. State
    /// switches are expensive on the host, so reselecting the same
    /// index must not emit a second batch step.
    pub current_shader: Option<u8>,
}

impl Default for GxState {
    fn default() -> Self {
        Self::new()
    }
}

impl GxState {
    pub fn new() -> Self {
        Self {
            regs: VatRegs::new(),
            xf: XfMem::new(),
            current_shader: None,
        }
    }

    pub fn reset(&mut self) {
        self.regs.reset();
        self.xf.reset();
        self.current_shader = None;
    }
}
