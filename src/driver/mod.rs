//! Narrow driver surface consumed by the session engine.
//!
//! The shell does not own the wire protocol: connection management, command
//! execution, cursor iteration and topology discovery belong to the MongoDB
//! driver. This module defines the small interface the engine needs:
//! a database handle, a document stream with an alive flag, write
//! acknowledgements and a topology snapshot. The [`mongo`] adapter
//! implements it over the `mongodb` crate. Tests substitute in-memory
//! fakes for the same traits.

pub mod mongo;
pub mod topology;

pub use topology::{ServerDescription, ServerType, TopologyDescription, TopologyType};

use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::Result;

/// Server-backed stream of documents with bounded fetch and an alive flag.
#[async_trait]
pub trait DocumentStream: Send {
    /// Fetch the next document, or `None` at end of stream.
    async fn try_next(&mut self) -> Result<Option<Document>>;

    /// Whether more data may still be available.
    ///
    /// Stays true until a fetch has actually observed end-of-stream.
    fn alive(&self) -> bool;
}

/// Cloneable handle to a live document stream.
///
/// The stream needs mutable access and is not `Clone`, so the handle wraps
/// it in a mutex; cloning the handle shares the same underlying cursor.
/// This lets the classifier bind the same cursor to both `it` and `_`, and
/// lets the operator re-evaluate `it` to fetch the next page.
#[derive(Clone)]
pub struct CursorHandle {
    inner: Arc<Mutex<Box<dyn DocumentStream>>>,
}

impl CursorHandle {
    /// Wrap a stream in a shared handle.
    pub fn new(stream: Box<dyn DocumentStream>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(stream)),
        }
    }

    /// Lock the underlying stream for iteration.
    ///
    /// The cursor stays locked until the guard is dropped.
    pub async fn stream(&self) -> MutexGuard<'_, Box<dyn DocumentStream>> {
        self.inner.lock().await
    }
}

impl std::fmt::Debug for CursorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorHandle").finish_non_exhaustive()
    }
}

/// Acknowledgement of a mutating database operation.
///
/// Single-document inserts are the only kind summarized down to
/// `{acknowledged, inserted_id}`; every other kind carries its full raw
/// result structure.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteAck {
    /// Single insert.
    InsertOne {
        acknowledged: bool,
        inserted_id: Bson,
    },

    /// Multi-document insert.
    InsertMany { raw: Document },

    /// Update (one or many).
    Update { raw: Document },

    /// Delete (one or many).
    Delete { raw: Document },

    /// Bulk write.
    Bulk { raw: Document },
}

impl WriteAck {
    /// The structure rendered for this acknowledgement.
    ///
    /// A single insert exposes exactly `{acknowledged, inserted_id}`;
    /// all other kinds expose their raw result document.
    pub fn summary(&self) -> Document {
        match self {
            WriteAck::InsertOne {
                acknowledged,
                inserted_id,
            } => doc! {
                "acknowledged": *acknowledged,
                "inserted_id": inserted_id.clone(),
            },
            WriteAck::InsertMany { raw }
            | WriteAck::Update { raw }
            | WriteAck::Delete { raw }
            | WriteAck::Bulk { raw } => raw.clone(),
        }
    }
}

/// Handle to an active database context.
///
/// One of these is the session's `current_database`; `use` replaces it
/// wholesale with a handle to a sibling database on the same client.
#[async_trait]
pub trait DatabaseHandle: Send + Sync {
    /// Short name of this database.
    fn name(&self) -> &str;

    /// Handle to a sibling database on the same connection.
    fn database(&self, name: &str) -> Arc<dyn DatabaseHandle>;

    /// Fresh snapshot of the deployment topology.
    ///
    /// Never cached; computed from the connection on every call.
    async fn topology(&self) -> Result<TopologyDescription>;

    /// Run a command against this database.
    async fn run_command(&self, command: Document) -> Result<Document>;

    /// Run a command against the `admin` database.
    async fn run_admin_command(&self, command: Document) -> Result<Document>;

    /// Server version string.
    async fn server_version(&self) -> Result<String>;

    async fn find(&self, collection: &str, filter: Document) -> Result<CursorHandle>;

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    async fn aggregate(&self, collection: &str, pipeline: Vec<Document>) -> Result<CursorHandle>;

    async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<WriteAck>;

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<WriteAck>;

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<WriteAck>;

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<WriteAck>;

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<WriteAck>;

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<WriteAck>;
}
