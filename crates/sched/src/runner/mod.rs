//! The task scheduler.
//!
//! Split into focused submodules:
//! - `core`: TaskScheduler struct, constructor, accessors, and the stop signal
//! - `dispatch`: the step-wise driving surface (`next_task_id`, `update`,
//!   `stop_task`)
//! - `tune`: the bundled tuning loop built on top of the step surface

mod core;
mod dispatch;
mod tune;


pub use self::core::TaskScheduler;
