//! The scene layer: bit-packed bytecode interpretation and per-entity
//! render orchestration sitting above the raw display-list decoder.

pub mod bits;
pub mod entity;
pub mod interp;
pub mod shader;
