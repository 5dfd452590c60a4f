/// Summary of a single [`HttpCoordinator::tick`](crate::coordinator::HttpCoordinator::tick).
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    /// Entries whose transport finished during this tick (success or error)
    pub completed: usize,
    /// Entries that exceeded their timeout during this tick
    pub timed_out: usize,
    /// Entries still in flight after this tick
    pub in_flight: usize,
    /// Completion callbacks invoked, over all resolved entries
    pub callbacks_invoked: usize,
    /// Callbacks that returned an error or panicked
    pub callback_faults: usize,
}

impl TickResult {
    /// True when the tick did not resolve anything
    pub fn is_idle(&self) -> bool {
        self.completed == 0 && self.timed_out == 0
    }
}
