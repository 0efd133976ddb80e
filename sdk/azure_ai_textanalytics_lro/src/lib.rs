#![doc = include_str!("../README.md")]

pub mod adapter;
pub mod blocking;
pub mod cursor;
pub mod driver;
pub mod handle;
pub mod poller;
pub mod state;
pub mod target;

pub use adapter::{CancelCall, JobEnvelope, LroAdapter, PageContent, SubmitRequest};
pub use blocking::BlockingLroPoller;
pub use cursor::{ContinuationCursor, PageOptions};
pub use handle::JobHandle;
pub use poller::{CancelConfirmation, LroPoller, ResultPage};
pub use state::{OperationSnapshot, OperationState, TaskProgress};
