#![doc = include_str!("../README.md")]

pub mod sampler;
pub mod schedule;

pub(crate) mod executor;
pub(crate) mod runner;

mod error;

pub use error::Error;
pub use load_test::LoadTest;
pub use sampler::Sampler;
pub use schedule::StageSchedule;

/// Error type a request function is allowed to fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub use rampart_core as core;

pub mod prelude {
    pub use crate::load_test::LoadTest;
    pub use rampart_core::{RequestOutcome, RunResult, Stage};
}
