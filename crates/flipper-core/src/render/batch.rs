//! Deferred render batches.
//!
//! A batch is an append-only, replayable recording of everything one
//! decode produced: state switches, vertex runs, and references to
//! other batches. Decoding is expensive, replay is cheap, so batches
//! are cached per `(stream, entity, render params)` and executed many
//! times. `is_empty` doubles as the "already decoded" cache check.

use std::rc::Rc;
use std::time::{Duration, Instant};

use glam::Vec3;

use crate::gx::display_list::{Topology, Vertex, VertexSink};
use crate::render::backend::RenderBackend;
use crate::render::picker::PickerId;
use crate::scene::shader::{PipelineState, TextureBinding};

/// A deferred state mutation. Kept as data, not closures, so batches
/// can be inspected and tested.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    Pipeline(PipelineState),
    BindTexture { unit: u8, binding: TextureBinding },
    Picker(PickerId),
}

/// One recorded step.
#[derive(Clone)]
pub enum BatchStep {
    State(StateChange),
    Draw { topology: Topology, verts: Vec<Vertex> },
    /// Nested sub-batch, replayed in place.
    Batch(Rc<RenderBatch>),
}

/// Axis-aligned bounds accumulated from every recorded vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// Inverted extents; folding any point makes it valid.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn fold_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn fold(&mut self, other: &Aabb) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }
}

/// Aggregate counters from one `execute` walk.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BatchStats {
    pub vertices: u64,
    pub primitives: u64,
    pub uploads: u64,
    pub upload_bytes: u64,
    pub state_switches: u64,
    pub step_failures: u64,
    pub elapsed: Duration,
}

impl BatchStats {
    fn merge(&mut self, other: &BatchStats) {
        self.vertices += other.vertices;
        self.primitives += other.primitives;
        self.uploads += other.uploads;
        self.upload_bytes += other.upload_bytes;
        self.state_switches += other.state_switches;
        self.step_failures += other.step_failures;
    }
}

/// The recorded batch itself.
#[derive(Default)]
pub struct RenderBatch {
    steps: Vec<BatchStep>,
    bounds: Aabb,
}

impl RenderBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pervasive "has anything been decoded into this" check.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[BatchStep] {
        &self.steps
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Append a deferred state mutation.
    pub fn add_state(&mut self, change: StateChange) {
        self.steps.push(BatchStep::State(change));
    }

    /// Append a primitive submission, folding each position into the
    /// running bounds.
    pub fn add_vertices(&mut self, topology: Topology, verts: &[Vertex]) {
        for v in verts {
            self.bounds.fold_point(Vec3::from_array(v.pos));
        }
        self.steps.push(BatchStep::Draw {
            topology,
            verts: verts.to_vec(),
        });
    }

    /// Splice other batches in order as nested steps.
    pub fn add_batches<I>(&mut self, batches: I)
    where
        I: IntoIterator<Item = Rc<RenderBatch>>,
    {
        for b in batches {
            self.bounds.fold(&b.bounds);
            self.steps.push(BatchStep::Batch(b));
        }
    }

    /// Replay every step against the backend.
    ///
    /// A failing step is logged and skipped rather than aborting the
    /// walk; whether to abandon the whole frame is the caller's call,
    /// made off `step_failures`.
    pub fn execute(&self, backend: &mut dyn RenderBackend) -> BatchStats {
        let start = Instant::now();
        let mut stats = BatchStats::default();
        self.execute_steps(backend, &mut stats);
        stats.elapsed = start.elapsed();
        stats
    }

    fn execute_steps(&self, backend: &mut dyn RenderBackend, stats: &mut BatchStats) {
        for step in &self.steps {
            match step {
                BatchStep::State(change) => {
                    stats.state_switches += 1;
                    let result = match change {
                        StateChange::Pipeline(ps) => backend.set_pipeline(ps),
                        StateChange::BindTexture { unit, binding } => {
                            backend.bind_texture(*unit, binding)
                        }
                        StateChange::Picker(id) => backend.set_picker(*id),
                    };
                    if let Err(e) = result {
                        log::error!("batch state step failed: {e}");
                        stats.step_failures += 1;
                    }
                }
                BatchStep::Draw { topology, verts } => {
                    stats.vertices += verts.len() as u64;
                    stats.primitives += topology.primitive_count(verts.len()) as u64;
                    stats.uploads += 1;
                    stats.upload_bytes += (verts.len() * std::mem::size_of::<Vertex>()) as u64;
                    if let Err(e) = backend.draw(*topology, verts) {
                        log::error!("batch draw step failed: {e}");
                        stats.step_failures += 1;
                    }
                }
                BatchStep::Batch(sub) => {
                    let sub_stats = sub.execute(backend);
                    stats.merge(&sub_stats);
                }
            }
        }
    }
}

/// Recording a decode straight into a batch: the batch is the normal
/// vertex sink for the display-list decoder.
impl VertexSink for RenderBatch {
    fn submit(&mut self, topology: Topology, verts: &[Vertex]) {
        self.add_vertices(topology, verts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::scene::shader::{BlendMode, ShaderRecord};

    /// Backend that records call order and can be told to fail.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<String>,
        fail_draws: bool,
    }

    impl RenderBackend for RecordingBackend {
        fn set_pipeline(&mut self, state: &PipelineState) -> Result<(), BackendError> {
            self.calls.push(format!("pipeline {:?}", state.blend));
            Ok(())
        }

        fn bind_texture(&mut self, unit: u8, _b: &TextureBinding) -> Result<(), BackendError> {
            self.calls.push(format!("tex {unit}"));
            Ok(())
        }

        fn draw(&mut self, topology: Topology, verts: &[Vertex]) -> Result<(), BackendError> {
            if self.fail_draws {
                return Err(BackendError("simulated".into()));
            }
            self.calls.push(format!("draw {:?} {}", topology, verts.len()));
            Ok(())
        }
    }

    fn vert(x: f32, y: f32, z: f32) -> Vertex {
        Vertex {
            pos: [x, y, z],
            ..Vertex::default()
        }
    }

    #[test]
    fn empty_batch_is_a_legal_noop() {
        let batch = RenderBatch::new();
        assert!(batch.is_empty());
        let stats = batch.execute(&mut NullRecording::default());
        assert_eq!(stats.vertices, 0);
        assert_eq!(stats.step_failures, 0);
    }

    #[derive(Default)]
    struct NullRecording;
    impl RenderBackend for NullRecording {
        fn set_pipeline(&mut self, _s: &PipelineState) -> Result<(), BackendError> {
            Ok(())
        }
        fn bind_texture(&mut self, _u: u8, _b: &TextureBinding) -> Result<(), BackendError> {
            Ok(())
        }
        fn draw(&mut self, _t: Topology, _v: &[Vertex]) -> Result<(), BackendError> {
            Ok(())
        }
    }

    #[test]
    fn bounds_accumulate_over_draws_and_subbatches() {
        let mut sub = RenderBatch::new();
        sub.add_vertices(Topology::Points, &[vert(-5.0, 0.0, 0.0)]);

        let mut batch = RenderBatch::new();
        batch.add_vertices(Topology::Triangles, &[
            vert(0.0, 0.0, 0.0),
            vert(10.0, 0.0, 0.0),
            vert(0.0, 10.0, 3.0),
        ]);
        batch.add_batches([Rc::new(sub)]);

        let b = batch.bounds();
        assert_eq!(b.min, Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(b.max, Vec3::new(10.0, 10.0, 3.0));
    }

    #[test]
    fn execute_replays_in_order_with_stats() {
        let mut batch = RenderBatch::new();
        batch.add_state(StateChange::Pipeline(ShaderRecord::default().pipeline_state()));
        batch.add_vertices(Topology::Triangles, &[vert(0.0, 0.0, 0.0); 6]);

        let mut sub = RenderBatch::new();
        sub.add_vertices(Topology::Lines, &[vert(1.0, 0.0, 0.0); 4]);
        batch.add_batches([Rc::new(sub)]);

        let mut backend = RecordingBackend::default();
        let stats = batch.execute(&mut backend);

        assert_eq!(
            backend.calls,
            vec![
                format!("pipeline {:?}", BlendMode::Opaque),
                "draw Triangles 6".to_string(),
                "draw Lines 4".to_string(),
            ]
        );
        assert_eq!(stats.vertices, 10);
        assert_eq!(stats.primitives, 2 + 2); // 2 tris + 2 lines
        assert_eq!(stats.uploads, 2);
        assert_eq!(stats.state_switches, 1);
    }

    #[test]
    fn failing_step_is_logged_not_fatal() {
        let mut batch = RenderBatch::new();
        batch.add_vertices(Topology::Points, &[vert(0.0, 0.0, 0.0)]);
        batch.add_state(StateChange::BindTexture {
            unit: 0,
            binding: TextureBinding::Placeholder,
        });

        let mut backend = RecordingBackend {
            fail_draws: true,
            ..RecordingBackend::default()
        };
        let stats = batch.execute(&mut backend);
        assert_eq!(stats.step_failures, 1);
        // The later state step still ran.
        assert_eq!(backend.calls, vec!["tex 0".to_string()]);
    }
}
