//! Session worker
//!
//! Runs a [`Session`] on a blocking thread and serves commands from any
//! number of [`SessionHandle`]s. Commands are handled one at a time, so an
//! import never overlaps another operation.

use std::path::PathBuf;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::backup::{ExportOutcome, ImportOutcome};
use crate::cache::ViewCache;
use crate::config::ExportMode;
use crate::models::{Image, Note, NoteText};
use crate::session::{Session, SessionError, SessionResult};
use crate::storage::StorageStats;
use crate::surfaces::Surfaces;

type Reply<T> = oneshot::Sender<SessionResult<T>>;

/// Commands sent to the worker
#[derive(Debug)]
pub enum SessionCommand {
    AddNote { text: NoteText, reply: Reply<Note> },
    EditNote { id: i64, text: NoteText, reply: Reply<bool> },
    DeleteNote { id: i64, reply: Reply<bool> },
    AddImage { uri: String, reply: Reply<Image> },
    UpdateImage { id: i64, uri: String, reply: Reply<bool> },
    DeleteImage { id: i64, reply: Reply<bool> },
    CaptureImage { reply: Reply<Option<Image>> },
    Export { mode: ExportMode, reply: Reply<ExportOutcome> },
    /// Ask the picker for a file, then import it
    Import { reply: Reply<ImportOutcome> },
    /// Import a file the caller already chose
    ImportFrom { path: PathBuf, reply: Reply<ImportOutcome> },
    /// Copy of the notes cache
    Notes { reply: oneshot::Sender<ViewCache<Note>> },
    /// Copy of the images cache
    Images { reply: oneshot::Sender<ViewCache<Image>> },
    Stats { reply: oneshot::Sender<StorageStats> },
    /// Close the store and stop the worker
    Shutdown,
}

/// Worker status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Waiting for a command
    Idle,
    /// Handling a command
    Busy,
    /// Replacing the store file
    Importing,
    /// No longer accepting commands
    Stopped,
}

/// Cloneable handle to the session worker
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    status_rx: watch::Receiver<WorkerStatus>,
}

/// Spawn the worker on tokio's blocking pool
///
/// Must be called from within a tokio runtime. The worker stops when
/// [`SessionHandle::shutdown`] is called or every handle is dropped.
pub fn spawn_session_worker<S>(session: Session, surfaces: S) -> SessionHandle
where
    S: Surfaces + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(32);
    let (status_tx, status_rx) = watch::channel(WorkerStatus::Idle);

    tokio::task::spawn_blocking(move || worker_loop(session, surfaces, command_rx, status_tx));

    SessionHandle {
        command_tx,
        status_rx,
    }
}

fn worker_loop<S: Surfaces>(
    mut session: Session,
    mut surfaces: S,
    mut command_rx: mpsc::Receiver<SessionCommand>,
    status_tx: watch::Sender<WorkerStatus>,
) {
    info!("Session worker started");

    while let Some(command) = command_rx.blocking_recv() {
        let status = match command {
            SessionCommand::Shutdown => break,
            SessionCommand::Import { .. } | SessionCommand::ImportFrom { .. } => {
                WorkerStatus::Importing
            }
            _ => WorkerStatus::Busy,
        };
        let _ = status_tx.send(status);
        handle_command(&mut session, &mut surfaces, command);
        let _ = status_tx.send(WorkerStatus::Idle);
    }
    drop(command_rx);

    if let Err(e) = session.close() {
        warn!("Failed to close store on shutdown: {}", e);
    }
    let _ = status_tx.send(WorkerStatus::Stopped);
    info!("Session worker stopped");
}

/// Run one command; a dropped reply receiver is not an error
fn handle_command<S: Surfaces>(session: &mut Session, surfaces: &mut S, command: SessionCommand) {
    debug!("Handling {}", command_name(&command));

    match command {
        SessionCommand::AddNote { text, reply } => {
            let _ = reply.send(session.add_note(&text));
        }
        SessionCommand::EditNote { id, text, reply } => {
            let _ = reply.send(session.edit_note(id, &text));
        }
        SessionCommand::DeleteNote { id, reply } => {
            let _ = reply.send(session.delete_note(id));
        }
        SessionCommand::AddImage { uri, reply } => {
            let _ = reply.send(session.add_image(&uri));
        }
        SessionCommand::UpdateImage { id, uri, reply } => {
            let _ = reply.send(session.update_image(id, &uri));
        }
        SessionCommand::DeleteImage { id, reply } => {
            let _ = reply.send(session.delete_image(id));
        }
        SessionCommand::CaptureImage { reply } => {
            let _ = reply.send(session.capture_image(surfaces));
        }
        SessionCommand::Export { mode, reply } => {
            let _ = reply.send(session.export(mode, surfaces));
        }
        SessionCommand::Import { reply } => {
            let _ = reply.send(session.import(surfaces));
        }
        SessionCommand::ImportFrom { path, reply } => {
            let _ = reply.send(session.import_from_path(&path));
        }
        SessionCommand::Notes { reply } => {
            let _ = reply.send(session.notes().clone());
        }
        SessionCommand::Images { reply } => {
            let _ = reply.send(session.images().clone());
        }
        SessionCommand::Stats { reply } => {
            let _ = reply.send(session.store().storage_stats());
        }
        SessionCommand::Shutdown => {}
    }
}

fn command_name(command: &SessionCommand) -> &'static str {
    match command {
        SessionCommand::AddNote { .. } => "add_note",
        SessionCommand::EditNote { .. } => "edit_note",
        SessionCommand::DeleteNote { .. } => "delete_note",
        SessionCommand::AddImage { .. } => "add_image",
        SessionCommand::UpdateImage { .. } => "update_image",
        SessionCommand::DeleteImage { .. } => "delete_image",
        SessionCommand::CaptureImage { .. } => "capture_image",
        SessionCommand::Export { .. } => "export",
        SessionCommand::Import { .. } => "import",
        SessionCommand::ImportFrom { .. } => "import_from",
        SessionCommand::Notes { .. } => "notes",
        SessionCommand::Images { .. } => "images",
        SessionCommand::Stats { .. } => "stats",
        SessionCommand::Shutdown => "shutdown",
    }
}

impl SessionHandle {
    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> SessionResult<T> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(command(reply))
            .await
            .map_err(|_| SessionError::WorkerStopped)?;
        response.await.map_err(|_| SessionError::WorkerStopped)
    }

    pub async fn add_note(&self, text: NoteText) -> SessionResult<Note> {
        self.call(|reply| SessionCommand::AddNote { text, reply }).await?
    }

    pub async fn edit_note(&self, id: i64, text: NoteText) -> SessionResult<bool> {
        self.call(|reply| SessionCommand::EditNote { id, text, reply })
            .await?
    }

    pub async fn delete_note(&self, id: i64) -> SessionResult<bool> {
        self.call(|reply| SessionCommand::DeleteNote { id, reply }).await?
    }

    pub async fn add_image(&self, uri: impl Into<String>) -> SessionResult<Image> {
        let uri = uri.into();
        self.call(|reply| SessionCommand::AddImage { uri, reply }).await?
    }

    pub async fn update_image(&self, id: i64, uri: impl Into<String>) -> SessionResult<bool> {
        let uri = uri.into();
        self.call(|reply| SessionCommand::UpdateImage { id, uri, reply })
            .await?
    }

    pub async fn delete_image(&self, id: i64) -> SessionResult<bool> {
        self.call(|reply| SessionCommand::DeleteImage { id, reply })
            .await?
    }

    pub async fn capture_image(&self) -> SessionResult<Option<Image>> {
        self.call(|reply| SessionCommand::CaptureImage { reply }).await?
    }

    pub async fn export(&self, mode: ExportMode) -> SessionResult<ExportOutcome> {
        self.call(|reply| SessionCommand::Export { mode, reply }).await?
    }

    pub async fn import(&self) -> SessionResult<ImportOutcome> {
        self.call(|reply| SessionCommand::Import { reply }).await?
    }

    pub async fn import_from(&self, path: impl Into<PathBuf>) -> SessionResult<ImportOutcome> {
        let path = path.into();
        self.call(|reply| SessionCommand::ImportFrom { path, reply })
            .await?
    }

    pub async fn notes(&self) -> SessionResult<ViewCache<Note>> {
        self.call(|reply| SessionCommand::Notes { reply }).await
    }

    pub async fn images(&self) -> SessionResult<ViewCache<Image>> {
        self.call(|reply| SessionCommand::Images { reply }).await
    }

    pub async fn stats(&self) -> SessionResult<StorageStats> {
        self.call(|reply| SessionCommand::Stats { reply }).await
    }

    /// Current worker status
    pub fn status(&self) -> WorkerStatus {
        *self.status_rx.borrow()
    }

    /// Stop the worker and wait until the store is closed
    ///
    /// Commands already queued are handled first.
    pub async fn shutdown(&self) {
        if self.command_tx.send(SessionCommand::Shutdown).await.is_err() {
            return;
        }

        let mut status_rx = self.status_rx.clone();
        while *status_rx.borrow_and_update() != WorkerStatus::Stopped {
            if status_rx.changed().await.is_err() {
                break;
            }
        }
    }
}
