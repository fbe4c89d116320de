//! Exception capture: record rendering, disk layout, retention and the
//! optional background queue.

pub mod record;
pub mod retention;
pub mod worker;
pub mod writer;

pub use record::CaptureRecord;
pub use retention::{RetentionEnforcer, RetentionOutcome};
pub use worker::{CaptureWorker, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
pub use writer::{ExceptionWriter, WrittenRecord};
