//! Deferred replay: batches, the host backend seam, picking, and
//! frame scheduling.

pub mod backend;
pub mod batch;
pub mod picker;
pub mod schedule;
