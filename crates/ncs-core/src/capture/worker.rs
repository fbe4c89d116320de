//! Background capture workers.
//!
//! Records are handed over through a bounded channel. When the queue is
//! full the record is dropped and counted; the caller never blocks.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use ncs_common::Result;

use super::record::CaptureRecord;
use super::writer::ExceptionWriter;
use crate::stats::EngineStats;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 1;

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Pool of threads draining a bounded capture queue.
#[derive(Debug)]
pub struct CaptureWorker {
    sender: Option<Sender<CaptureRecord>>,
    handles: Vec<JoinHandle<()>>,
    stats: Arc<EngineStats>,
}

impl CaptureWorker {
    pub fn spawn(
        writer: Arc<ExceptionWriter>,
        workers: usize,
        queue_capacity: usize,
        stats: Arc<EngineStats>,
    ) -> Result<Self> {
        let (sender, receiver) = bounded(queue_capacity.max(1));
        let mut handles = Vec::with_capacity(workers.max(1));

        for idx in 0..workers.max(1) {
            let receiver = receiver.clone();
            let writer = Arc::clone(&writer);
            let stats = Arc::clone(&stats);
            let handle = thread::Builder::new()
                .name(format!("ncs-capture-{}", idx))
                .spawn(move || drain(receiver, writer, stats))?;
            handles.push(handle);
        }

        debug!(workers = handles.len(), queue_capacity, "Capture workers started");
        Ok(Self {
            sender: Some(sender),
            handles,
            stats,
        })
    }

    /// Queue a record. Returns `false` if it was dropped.
    pub fn submit(&self, record: CaptureRecord) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(record)) => {
                self.stats.record_dropped();
                warn!(
                    source_id = %record.source_id,
                    "Capture queue full, dropping {}",
                    record.error.type_name
                );
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.stats.record_dropped();
                warn!("Capture workers are gone, dropping record");
                false
            }
        }
    }

    /// Records waiting in the queue.
    pub fn pending(&self) -> usize {
        self.sender.as_ref().map(Sender::len).unwrap_or(0)
    }

    /// Close the queue and wait for queued records to be written.
    pub fn shutdown(mut self) {
        self.close();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("Capture worker panicked");
            }
        }
    }

    fn close(&mut self) {
        self.sender.take();
    }
}

impl Drop for CaptureWorker {
    // Workers finish the queue on their own once the sender is gone.
    fn drop(&mut self) {
        self.close();
    }
}

fn drain(receiver: Receiver<CaptureRecord>, writer: Arc<ExceptionWriter>, stats: Arc<EngineStats>) {
    for record in receiver.iter() {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| writer.write(&record)));
        match outcome {
            Ok(Ok(_)) => stats.record_captured(),
            Ok(Err(e)) => {
                stats.record_capture_failure();
                warn!(code = e.code(), "Capture failed: {}", e);
            }
            Err(_) => {
                stats.record_capture_failure();
                warn!("Capture writer panicked on {}", record.error.type_name);
            }
        }
    }
    debug!("Capture worker exiting");
}
