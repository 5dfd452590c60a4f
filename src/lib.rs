//! Tick-driven HTTP request coordination for the Gosub engine.
//!
//! Callers issue URL-addressed fetches through an [`HttpCoordinator`]; concurrent requests for
//! the same URL share one transport call, and every caller is notified through its own
//! completion callback once that call finishes or times out. The host drives everything by
//! calling [`HttpCoordinator::tick`] on its own cadence.

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod events;
pub mod net;
pub mod tick;

pub use config::CoordinatorConfig;
pub use coordinator::{Completion, HttpCoordinator, LoadRequest, LoadStatus};
pub use errors::CoordinatorError;
pub use tick::TickResult;
