//! Bundled measurement collaborators.
//!
//! [`LocalMeasurer`] runs measurement closures on the blocking thread pool
//! with an optional per-trial time limit. [`StaticSpace`] serves
//! pre-enumerated candidates, mainly for tests and replays. Production
//! backends implement the [`Measurer`] and [`CandidateSource`] traits from
//! `tunetable-core` directly.
//!
//! [`Measurer`]: tunetable_core::Measurer
//! [`CandidateSource`]: tunetable_core::CandidateSource

mod local;
mod space;

pub use local::LocalMeasurer;
pub use space::StaticSpace;
