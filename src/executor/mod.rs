//! Statement evaluation.
//!
//! [`evaluate`] turns a parsed [`Statement`] into a session [`Value`].
//! Listing commands (`show dbs`, `show collections`) print their tables
//! directly and evaluate to the unit sentinel; everything else hands its
//! value back for the result classifier to render.

use std::sync::Arc;

use bson::{doc, Bson, Document};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::debug;

use crate::driver::{mongo, DatabaseHandle};
use crate::error::{ConnectionError, EvalError, Result};
use crate::output::OutputSink;
use crate::parser::{QueryOp, QueryStatement, Statement};
use crate::session::{SessionState, Value};
use crate::utils::{format_bytes, format_si};

const HELP_TEXT: &str = "\
Statements:
  use <db>                          switch the active database
  connect(\"<url>\")                  connect and select the URL's database
  show dbs                          list databases with disk sizes
  show collections                  list collections with storage stats
  db                                the active database
  db.<coll>.find({ ... })           query documents (paginated)
  db.<coll>.findOne({ ... })        fetch a single document
  db.<coll>.insertOne({ ... })      insert a document
  db.<coll>.insertMany([ ... ])     insert several documents
  db.<coll>.updateOne(f, u)         update the first match
  db.<coll>.updateMany(f, u)        update all matches
  db.<coll>.deleteOne(f)            delete the first match
  db.<coll>.deleteMany(f)           delete all matches
  db.<coll>.aggregate([ ... ])      run an aggregation pipeline
  db.<coll>.countDocuments({ ... }) count matching documents
  it                                fetch the next page of the last cursor
  NAME = <literal>                  bind a name (flags live here too)
  exit | quit                       leave the shell

Flags: DISPLAY_RESULTS, MAX_PAGE_SIZE, OUTPUT_FORMAT ('repr' | 'json'),
OUTPUT_JSON_OPTIONS ('relaxed' | 'canonical'), OUTPUT_JSON_INDENT";

/// Evaluate one statement against the session.
///
/// # Arguments
///
/// * `state` - The session the statement reads and mutates
/// * `statement` - The parsed statement
/// * `out` - Sink for output the statement produces itself
///
/// # Returns
///
/// * `Result<Value>` - The statement's value; unit when it produced none
pub async fn evaluate(
    state: &mut SessionState,
    statement: Statement,
    out: &mut dyn OutputSink,
) -> Result<Value> {
    match statement {
        Statement::Empty | Statement::Exit => Ok(Value::Unit),

        Statement::Help => {
            out.print(HELP_TEXT);
            Ok(Value::Unit)
        }

        Statement::Use(name) => {
            let current = require_database(state)?;
            let next = current.database(&name);
            debug!(database = %name, "switching database");
            state.set_database(next.clone());
            Ok(Value::Database(next))
        }

        Statement::Connect(url) => {
            let database: Arc<dyn DatabaseHandle> = Arc::new(mongo::connect(&url).await?);
            state.set_database(database.clone());
            Ok(Value::Database(database))
        }

        Statement::ShowDatabases => {
            show_databases(state, out).await?;
            Ok(Value::Unit)
        }

        Statement::ShowCollections => {
            show_collections(state, out).await?;
            Ok(Value::Unit)
        }

        Statement::Assign { name, value } => {
            state.set(&name, bson_to_value(value));
            Ok(Value::Unit)
        }

        Statement::Lookup(name) => lookup(state, &name),

        Statement::Query(query) => {
            let database = require_database(state)?;
            run_query(database, query).await
        }
    }
}

fn require_database(state: &SessionState) -> Result<Arc<dyn DatabaseHandle>> {
    state
        .database()
        .ok_or_else(|| ConnectionError::NotConnected.into())
}

fn bson_to_value(value: Bson) -> Value {
    match value {
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::Int(n as i64),
        Bson::Int64(n) => Value::Int(n),
        Bson::String(s) => Value::String(s),
        Bson::Document(doc) => Value::Document(doc),
        other => Value::Bson(other),
    }
}

fn lookup(state: &SessionState, name: &str) -> Result<Value> {
    if name == "db" {
        // Unconnected sessions have no db to show.
        return Ok(match state.database() {
            Some(database) => Value::Database(database),
            None => Value::Unit,
        });
    }
    state
        .get(name)
        .ok_or_else(|| EvalError::UnknownName(name.to_string()).into())
}

async fn run_query(database: Arc<dyn DatabaseHandle>, query: QueryStatement) -> Result<Value> {
    let collection = query.collection.as_str();
    debug!(collection, operation = ?query.operation, "running collection operation");

    match query.operation {
        QueryOp::Find { filter } => Ok(Value::Cursor(database.find(collection, filter).await?)),
        QueryOp::FindOne { filter } => {
            Ok(match database.find_one(collection, filter).await? {
                Some(doc) => Value::Document(doc),
                None => Value::Unit,
            })
        }
        QueryOp::InsertOne { document } => Ok(Value::WriteAck(
            database.insert_one(collection, document).await?,
        )),
        QueryOp::InsertMany { documents } => Ok(Value::WriteAck(
            database.insert_many(collection, documents).await?,
        )),
        QueryOp::UpdateOne { filter, update } => Ok(Value::WriteAck(
            database.update_one(collection, filter, update).await?,
        )),
        QueryOp::UpdateMany { filter, update } => Ok(Value::WriteAck(
            database.update_many(collection, filter, update).await?,
        )),
        QueryOp::DeleteOne { filter } => Ok(Value::WriteAck(
            database.delete_one(collection, filter).await?,
        )),
        QueryOp::DeleteMany { filter } => Ok(Value::WriteAck(
            database.delete_many(collection, filter).await?,
        )),
        QueryOp::Aggregate { pipeline } => Ok(Value::Cursor(
            database.aggregate(collection, pipeline).await?,
        )),
        QueryOp::CountDocuments { filter } => {
            let count = database.count_documents(collection, filter).await?;
            Ok(Value::Int(count as i64))
        }
    }
}

/// `show dbs` - one row per database with its on-disk size.
async fn show_databases(state: &SessionState, out: &mut dyn OutputSink) -> Result<()> {
    let database = require_database(state)?;
    let reply = database
        .run_admin_command(doc! { "listDatabases": 1 })
        .await?;

    let mut builder = Builder::default();
    builder.push_record(["NAME", "DISK SIZE"]);

    if let Ok(databases) = reply.get_array("databases") {
        for entry in databases {
            let Some(entry) = entry.as_document() else {
                continue;
            };
            let name = entry.get_str("name").unwrap_or_default();
            let size = numeric(entry.get("sizeOnDisk")).unwrap_or(0.0);
            builder.push_record([name.to_string(), format_bytes(size)]);
        }
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    out.print(&table.to_string());
    Ok(())
}

/// `show collections` - storage statistics per collection.
///
/// Views get a name/type row only. System collections are hidden. A
/// collection whose stats request fails is reported inline and skipped;
/// the rest of the table is still produced.
async fn show_collections(state: &SessionState, out: &mut dyn OutputSink) -> Result<()> {
    let database = require_database(state)?;
    let reply = database.run_command(doc! { "listCollections": 1 }).await?;

    let mut infos: Vec<Document> = reply
        .get_document("cursor")
        .ok()
        .and_then(|cursor| cursor.get_array("firstBatch").ok())
        .map(|batch| {
            batch
                .iter()
                .filter_map(|entry| entry.as_document().cloned())
                .collect()
        })
        .unwrap_or_default();

    infos.sort_by(|a, b| {
        a.get_str("name")
            .unwrap_or_default()
            .cmp(&b.get_str("name").unwrap_or_default())
    });

    let mut builder = Builder::default();
    builder.push_record([
        "NAME",
        "TYPE",
        "COUNT",
        "SIZE",
        "STORAGE",
        "OBJ SIZE",
        "INDEXES",
        "INDEXES SIZE",
    ]);

    for info in &infos {
        let name = info.get_str("name").unwrap_or_default();
        let kind = info.get_str("type").unwrap_or("collection");

        if name.starts_with("system.") {
            continue;
        }

        if kind == "view" {
            builder.push_record([name, kind, "", "", "", "", "", ""]);
            continue;
        }

        let pipeline = vec![doc! { "$collStats": { "storageStats": { "scale": 1 } } }];
        let stats = match collection_stats(database.as_ref(), name, pipeline).await {
            Ok(Some(stats)) => stats,
            Ok(None) => continue,
            Err(err) => {
                out.print(&format!("No {name}: {err}"));
                continue;
            }
        };

        let count = match numeric(stats.get("count")) {
            Some(n) => format_si(n),
            None => "N/A".to_string(),
        };
        builder.push_record([
            name.to_string(),
            kind.to_string(),
            count,
            format_bytes(numeric(stats.get("size")).unwrap_or(0.0)),
            format_bytes(numeric(stats.get("storageSize")).unwrap_or(0.0)),
            format_bytes(numeric(stats.get("avgObjSize")).unwrap_or(0.0)),
            format_si(numeric(stats.get("nindexes")).unwrap_or(0.0)),
            format_bytes(numeric(stats.get("totalIndexSize")).unwrap_or(0.0)),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    out.print(&table.to_string());
    Ok(())
}

/// First `storageStats` document of a `$collStats` aggregation.
async fn collection_stats(
    database: &dyn DatabaseHandle,
    collection: &str,
    pipeline: Vec<Document>,
) -> Result<Option<Document>> {
    let cursor = database.aggregate(collection, pipeline).await?;
    let mut stream = cursor.stream().await;
    let Some(first) = stream.try_next().await? else {
        return Ok(None);
    };
    Ok(first.get_document("storageStats").ok().cloned())
}

/// Numeric BSON value widened to f64, if it is one.
fn numeric(value: Option<&Bson>) -> Option<f64> {
    match value? {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}
