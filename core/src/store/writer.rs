//! Single-writer queue feeding library snapshots into the blob store.
//!
//! Mutations are fire-and-forget: the caller enqueues a fully serialized
//! snapshot and returns immediately. A dedicated thread applies writes in
//! enqueue order, so the last write always reflects the latest state. When
//! several snapshots pile up behind a slow write only the newest one is
//! written; intermediate snapshots are superseded under the single-key,
//! last-write-wins contract.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use tracing::warn;

use super::blob::BlobStore;

#[derive(Debug)]
enum Msg {
    Snapshot(String),
    Flush(mpsc::Sender<()>),
}

/// Handle to the background persistence thread. Dropping it flushes any
/// pending snapshot and joins the thread.
#[derive(Debug)]
pub struct PersistWriter {
    tx: Option<mpsc::Sender<Msg>>,
    handle: Option<JoinHandle<()>>,
}

impl PersistWriter {
    /// Spawn the writer thread persisting snapshots under `key`.
    pub fn spawn(store: Arc<dyn BlobStore>, key: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        let key = key.to_string();
        let handle = thread::Builder::new()
            .name("shelf-persist".into())
            .spawn(move || run(store, &key, rx))
            .ok();

        if handle.is_none() {
            warn!("failed to spawn persistence thread; writes will be dropped");
        }

        Self { tx: handle.is_some().then_some(tx), handle }
    }

    /// Queue a snapshot for writing. Never blocks, never fails the caller.
    pub fn enqueue(&self, snapshot: String) {
        let Some(tx) = &self.tx else { return };
        if tx.send(Msg::Snapshot(snapshot)).is_err() {
            warn!("persistence thread is gone; snapshot dropped");
        }
    }

    /// Block until every snapshot enqueued before this call has been written.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else { return };
        let (ack_tx, ack_rx) = mpsc::channel();
        if tx.send(Msg::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for PersistWriter {
    fn drop(&mut self) {
        // Close the channel first so the thread drains and exits.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(store: Arc<dyn BlobStore>, key: &str, rx: mpsc::Receiver<Msg>) {
    while let Ok(first) = rx.recv() {
        let mut latest = None;
        let mut acks = Vec::new();

        let mut absorb = |msg: Msg| match msg {
            Msg::Snapshot(snapshot) => latest = Some(snapshot),
            Msg::Flush(ack) => acks.push(ack),
        };
        absorb(first);
        while let Ok(msg) = rx.try_recv() {
            absorb(msg);
        }
        drop(absorb);

        if let Some(snapshot) = latest {
            if let Err(err) = store.set(key, &snapshot) {
                // Durability is degraded, never correctness; the in-memory
                // collection stays authoritative for the rest of the process.
                warn!(error = %err, "library snapshot write failed");
            }
        }

        for ack in acks {
            let _ = ack.send(());
        }
    }
}
