use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::analysis::{self, backend::AnalysisBackend};
use crate::errors::CoreError;
use crate::models::ArtAnalysis;
use crate::session::Ticket;

/// Backend shared with worker threads.
pub type SharedBackend = Arc<dyn AnalysisBackend + Send + Sync>;

/// Outcome of one background analysis, tagged with the ticket it was started for.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Result<ArtAnalysis, CoreError>,
}

/// Read, encode and analyze `path` on a background thread, then send the
/// completion on `tx`, wrapped by `wrap` so callers can multiplex it with their
/// own events on a single channel.
///
/// There is no cancellation. The caller decides whether the completion still
/// applies by handing the ticket back to `Session::resolve`.
pub fn spawn_analysis<E, F>(
    backend: SharedBackend,
    ticket: Ticket,
    path: PathBuf,
    tx: Sender<E>,
    wrap: F,
) -> thread::JoinHandle<()>
where
    E: Send + 'static,
    F: FnOnce(Completion) -> E + Send + 'static,
{
    thread::spawn(move || {
        let outcome = analysis::analyze_file(&*backend, &path);
        // The receiver is gone when the front end has already exited.
        let _ = tx.send(wrap(Completion { ticket, outcome }));
    })
}
