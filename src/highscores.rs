//! High score persistence
//!
//! A single integer survives between sessions. It is read once at startup
//! and written whenever a new best is reached. Writes go through a
//! [`BackgroundWriter`] so a slow disk never holds up a tick.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;

/// Persistence boundary for the high score
pub trait HighScoreStore: fmt::Debug + Send {
    /// Stored value, `Ok(0)` when nothing has been saved yet
    fn load(&self) -> Result<u64, PersistError>;

    fn save(&mut self, high_score: u64) -> Result<(), PersistError>;
}

/// On-disk document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
struct HighScoreDocument {
    high_score: u64,
}

/// Stores the high score as a small JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<u64, PersistError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let doc: HighScoreDocument = serde_json::from_str(&json)?;
        Ok(doc.high_score)
    }

    fn save(&mut self, high_score: u64) -> Result<(), PersistError> {
        let json = serde_json::to_string(&HighScoreDocument { high_score })?;
        // Write beside the target then rename so a crash never leaves half a file
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Keeps the high score in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously reached high score
    pub fn with_value(value: u64) -> Self {
        Self { value }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u64, PersistError> {
        Ok(self.value)
    }

    fn save(&mut self, high_score: u64) -> Result<(), PersistError> {
        self.value = high_score;
        Ok(())
    }
}

/// Read the stored high score, treating unreadable data as a fresh start
pub fn load_or_default(store: &dyn HighScoreStore) -> u64 {
    match store.load() {
        Ok(value) => {
            log::info!("Loaded high score {}", value);
            value
        }
        Err(e) => {
            log::warn!("Could not load high score, starting fresh: {}", e);
            0
        }
    }
}

enum WriteRequest {
    Save(u64),
    Flush(mpsc::Sender<()>),
}

/// Owns a store on a worker thread and feeds it the latest high score
#[derive(Debug)]
pub struct BackgroundWriter {
    tx: Option<mpsc::Sender<WriteRequest>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl BackgroundWriter {
    /// Move `store` onto a new writer thread. If the thread cannot be started
    /// the writer is inert and every save is dropped with a warning.
    pub fn spawn(store: Box<dyn HighScoreStore>) -> Self {
        let (tx, rx) = mpsc::channel();
        match thread::Builder::new()
            .name("high-score-writer".to_string())
            .spawn(move || write_loop(store, rx))
        {
            Ok(worker) => Self {
                tx: Some(tx),
                worker: Some(worker),
            },
            Err(e) => {
                log::warn!("Could not start high score writer, scores will not be saved: {}", e);
                Self {
                    tx: None,
                    worker: None,
                }
            }
        }
    }

    /// Queue a write and return immediately
    pub fn save(&self, high_score: u64) {
        let Some(tx) = &self.tx else {
            log::warn!("High score writer unavailable, dropping {}", high_score);
            return;
        };
        if tx.send(WriteRequest::Save(high_score)).is_err() {
            log::warn!("High score writer has stopped, dropping {}", high_score);
        }
    }

    /// Block until every queued write has been handed to the store
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (done_tx, done_rx) = mpsc::channel();
        if tx.send(WriteRequest::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish queued writes and exit
        self.tx = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("High score writer panicked");
            }
        }
    }
}

fn write_loop(mut store: Box<dyn HighScoreStore>, rx: mpsc::Receiver<WriteRequest>) {
    while let Ok(request) = rx.recv() {
        let mut latest = None;
        let mut waiting = Vec::new();
        let mut next = Some(request);
        // Coalesce everything already queued; only the newest value is written
        while let Some(request) = next {
            match request {
                WriteRequest::Save(value) => latest = Some(value),
                WriteRequest::Flush(done) => waiting.push(done),
            }
            next = rx.try_recv().ok();
        }
        if let Some(value) = latest {
            match store.save(value) {
                Ok(()) => log::debug!("Saved high score {}", value),
                Err(e) => log::warn!("Failed to persist high score {}: {}", value, e),
            }
        }
        for done in waiting {
            let _ = done.send(());
        }
    }
}
