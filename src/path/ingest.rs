//! Asynchronous path ingestion.
//!
//! Parsing a document happens off the tick loop on a short-lived worker
//! thread; the finished library comes back over a channel and is
//! installed by the tick loop as a single value swap, so a tick can
//! never observe a half-built set. Requests carry a generation number
//! and only the newest generation is ever accepted: re-ingesting a file
//! discards any in-flight previous parse outright.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

use super::parser::{parse_document, ViewBox};
use super::{ParseFailure, PathLibrary};

/// What an ingestion produced, for caller-side logging.
#[derive(Clone, Debug)]
pub struct IngestOutcome {
    /// Number of shapes installed
    pub installed: usize,
    /// Primitives dropped during parsing
    pub failures: Vec<ParseFailure>,
}

struct IngestResult {
    generation: u64,
    library: PathLibrary,
    failures: Vec<ParseFailure>,
}

/// Hands raw documents to a worker thread and collects the newest
/// finished library.
pub struct PathIngestor {
    sender: Sender<IngestResult>,
    receiver: Receiver<IngestResult>,
    generation: u64,
}

impl PathIngestor {
    /// Create an ingestor with an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            generation: 0,
        }
    }

    /// Start parsing a document in the background.
    ///
    /// Supersedes any request still in flight; the older result will be
    /// discarded when it arrives.
    pub fn request(&mut self, text: String, view_box: Option<ViewBox>) {
        self.generation += 1;
        let generation = self.generation;
        let sender = self.sender.clone();

        thread::spawn(move || {
            let (library, failures) = parse_document(&text, view_box);
            // The receiver only disappears when the simulation is torn
            // down, at which point the result is moot anyway.
            let _ = sender.send(IngestResult {
                generation,
                library,
                failures,
            });
        });
    }

    /// Collect the newest finished library, if any.
    ///
    /// Drains everything currently queued; results from superseded
    /// requests are dropped. Never blocks.
    pub fn poll(&mut self) -> Option<(PathLibrary, IngestOutcome)> {
        let mut newest = None;

        while let Ok(result) = self.receiver.try_recv() {
            if result.generation == self.generation {
                newest = Some(result);
            } else {
                debug!(
                    "discarding superseded ingest result (generation {} < {})",
                    result.generation, self.generation
                );
            }
        }

        newest.map(accept)
    }

    /// Block until the newest request finishes or the timeout elapses.
    ///
    /// Intended for headless runs and tests; the tick loop itself only
    /// ever uses [`PathIngestor::poll`].
    pub fn wait(&mut self, timeout: Duration) -> Option<(PathLibrary, IngestOutcome)> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(result) = self.poll() {
                return Some(result);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            match self.receiver.recv_timeout(remaining) {
                Ok(result) if result.generation == self.generation => {
                    return Some(accept(result));
                }
                // Superseded result: keep waiting for the current one.
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}

impl Default for PathIngestor {
    fn default() -> Self {
        Self::new()
    }
}

fn accept(result: IngestResult) -> (PathLibrary, IngestOutcome) {
    let outcome = IngestOutcome {
        installed: result.library.shape_count(),
        failures: result.failures,
    };
    (result.library, outcome)
}
