//! Request coalescing for the single-threaded render loop.
//!
//! Nothing here is parallel: callers set a pending flag, the next
//! display-refresh tick takes it (merging however many requests piled
//! up into one render), and a pending request can be superseded by
//! clearing the flag. Hit-test passes work the same way but resolve on
//! the following frame so the ID-encoded draw never flickers on screen.

/// Pending-work flags cleared on the next tick.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    redraw_pending: bool,
    pick_pending: Option<(u32, u32)>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw. Idempotent: repeated requests before the next
    /// tick merge into one.
    pub fn request_redraw(&mut self) {
        self.redraw_pending = true;
    }

    /// Supersede a pending redraw.
    pub fn cancel_redraw(&mut self) {
        self.redraw_pending = false;
    }

    /// Tick: report and clear the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_pending)
    }

    /// Ask for a hit-test at window coordinates. A newer request
    /// replaces an unserviced older one.
    pub fn request_pick(&mut self, x: u32, y: u32) {
        self.pick_pending = Some((x, y));
    }

    /// Tick: report and clear the pending hit-test, if any.
    pub fn take_pick(&mut self) -> Option<(u32, u32)> {
        self.pick_pending.take()
    }
}
