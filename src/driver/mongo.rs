//! MongoDB driver adapter.
//!
//! Implements the [`DatabaseHandle`](super::DatabaseHandle) and
//! [`DocumentStream`](super::DocumentStream) surface over the `mongodb`
//! crate. The topology snapshot is derived from the server `hello`
//! command on every call; the shell never caches topology state.

use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Cursor};
use tracing::debug;

use super::{CursorHandle, DatabaseHandle, DocumentStream, TopologyDescription, WriteAck};
use crate::error::{ConnectionError, Result};

/// Connect to a deployment and return a handle to its default database.
///
/// The database name is taken from the URL path, defaulting to `"test"`
/// when the path is empty.
pub async fn connect(url: &str) -> Result<MongoDatabase> {
    let options = ClientOptions::parse(url)
        .await
        .map_err(|e| ConnectionError::InvalidUrl(format!("{url}: {e}")))?;

    let name = options
        .default_database
        .clone()
        .unwrap_or_else(|| "test".to_string());
    let direct = options.direct_connection.unwrap_or(false);
    let address = options
        .hosts
        .first()
        .map(|h| h.to_string())
        .unwrap_or_else(|| "localhost:27017".to_string());

    let client = Client::with_options(options)
        .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

    debug!(database = %name, direct, "connected");

    Ok(MongoDatabase {
        client,
        name,
        direct,
        address,
    })
}

/// Database handle backed by a `mongodb::Client`.
#[derive(Clone)]
pub struct MongoDatabase {
    client: Client,
    name: String,

    /// Whether the client was opened with `directConnection`.
    direct: bool,

    /// Address of the contacted server, for topology snapshots.
    address: String,
}

impl MongoDatabase {
    fn collection(&self, name: &str) -> Collection<Document> {
        self.client.database(&self.name).collection::<Document>(name)
    }
}

#[async_trait]
impl DatabaseHandle for MongoDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn database(&self, name: &str) -> Arc<dyn DatabaseHandle> {
        Arc::new(MongoDatabase {
            client: self.client.clone(),
            name: name.to_string(),
            direct: self.direct,
            address: self.address.clone(),
        })
    }

    async fn topology(&self) -> Result<TopologyDescription> {
        let reply = self.run_admin_command(doc! { "hello": 1 }).await?;
        Ok(TopologyDescription::from_hello(
            &reply,
            &self.address,
            self.direct,
        ))
    }

    async fn run_command(&self, command: Document) -> Result<Document> {
        Ok(self.client.database(&self.name).run_command(command).await?)
    }

    async fn run_admin_command(&self, command: Document) -> Result<Document> {
        Ok(self.client.database("admin").run_command(command).await?)
    }

    async fn server_version(&self) -> Result<String> {
        let info = self.run_admin_command(doc! { "buildInfo": 1 }).await?;
        Ok(info.get_str("version").unwrap_or("unknown").to_string())
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<CursorHandle> {
        let cursor = self.collection(collection).find(filter).await?;
        Ok(CursorHandle::new(Box::new(MongoStream::new(cursor))))
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn aggregate(&self, collection: &str, pipeline: Vec<Document>) -> Result<CursorHandle> {
        let cursor = self.collection(collection).aggregate(pipeline).await?;
        Ok(CursorHandle::new(Box::new(MongoStream::new(cursor))))
    }

    async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64> {
        Ok(self.collection(collection).count_documents(filter).await?)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<WriteAck> {
        let result = self.collection(collection).insert_one(document).await?;
        Ok(WriteAck::InsertOne {
            acknowledged: true,
            inserted_id: result.inserted_id,
        })
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<WriteAck> {
        let result = self.collection(collection).insert_many(documents).await?;

        // The driver reports ids keyed by input index; render them in order.
        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        let ids: Vec<Bson> = ids.into_iter().map(|(_, id)| id).collect();

        Ok(WriteAck::InsertMany {
            raw: doc! {
                "acknowledged": true,
                "insertedIds": ids,
            },
        })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<WriteAck> {
        let result = self.collection(collection).update_one(filter, update).await?;
        Ok(WriteAck::Update {
            raw: update_raw(result),
        })
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<WriteAck> {
        let result = self
            .collection(collection)
            .update_many(filter, update)
            .await?;
        Ok(WriteAck::Update {
            raw: update_raw(result),
        })
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<WriteAck> {
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(WriteAck::Delete {
            raw: doc! {
                "acknowledged": true,
                "deletedCount": result.deleted_count as i64,
            },
        })
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<WriteAck> {
        let result = self.collection(collection).delete_many(filter).await?;
        Ok(WriteAck::Delete {
            raw: doc! {
                "acknowledged": true,
                "deletedCount": result.deleted_count as i64,
            },
        })
    }
}

/// Raw result document for an update acknowledgement.
fn update_raw(result: mongodb::results::UpdateResult) -> Document {
    let mut raw = doc! {
        "acknowledged": true,
        "matchedCount": result.matched_count as i64,
        "modifiedCount": result.modified_count as i64,
    };
    if let Some(id) = result.upserted_id {
        raw.insert("upsertedId", id);
    }
    raw
}

/// Live cursor wrapper tracking the alive flag.
///
/// The driver cursor does not expose liveness directly; the wrapper marks
/// the stream dead once a fetch has observed end-of-stream, which is
/// exactly when the exhaustion report must appear.
struct MongoStream {
    cursor: Cursor<Document>,
    done: bool,
}

impl MongoStream {
    fn new(cursor: Cursor<Document>) -> Self {
        Self {
            cursor,
            done: false,
        }
    }
}

#[async_trait]
impl DocumentStream for MongoStream {
    async fn try_next(&mut self) -> Result<Option<Document>> {
        if self.done {
            return Ok(None);
        }
        match self.cursor.try_next().await? {
            Some(doc) => Ok(Some(doc)),
            None => {
                self.done = true;
                Ok(None)
            }
        }
    }

    fn alive(&self) -> bool {
        !self.done
    }
}
