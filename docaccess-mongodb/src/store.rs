use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Bson, Document, doc};
use mongodb::{
    Client, Collection as MongoCollection,
    options::ClientOptions,
};
use docaccess_core::{
    backend::{Connector, PRIMARY_KEY, StoreBackend, WriteResult},
    config::ConnectOpts,
    cursor::Cursor,
    error::{StorageError, StorageResult},
};

use crate::patch::{MONGO_KEY, flatten_update, from_stored, to_stored};


#[derive(Debug, Clone)]
pub struct MongoDbStore {
    client: Client,
}

impl MongoDbStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn get_collection(&self, db: &str, table: &str) -> MongoCollection<Document> {
        self.client
            .database(db)
            .collection(table)
    }

    async fn find(&self, db: &str, table: &str, filter: Document) -> StorageResult<Cursor> {
        Ok(
            self.get_collection(db, table)
                .find(filter)
                .await
                .map_err(backend_error)?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(backend_error)?
                .into_iter()
                .map(from_stored)
                .collect()
        )
    }
}

fn backend_error(err: mongodb::error::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

/// Builds a connection string from an address that may already carry a scheme.
pub(crate) fn connection_uri(address: &str) -> String {
    if address.starts_with("mongodb://") || address.starts_with("mongodb+srv://") {
        address.to_string()
    } else {
        format!("mongodb://{address}")
    }
}

/// Maps the access layer's pool and timeout settings onto driver options.
pub(crate) fn apply_connect_opts(options: &mut ClientOptions, opts: &ConnectOpts) {
    options.max_pool_size = Some(opts.max_open);
    options.min_pool_size = Some(opts.max_idle.min(opts.max_open));
    options.connect_timeout = Some(opts.timeout);
    options.server_selection_timeout = Some(opts.timeout);

    if !opts.database.is_empty() {
        options.default_database = Some(opts.database.clone());
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert(&self, db: &str, table: &str, mut document: Document) -> StorageResult<WriteResult> {
        let mut result = WriteResult { inserted: 1, ..WriteResult::default() };

        match document.get(PRIMARY_KEY) {
            Some(Bson::String(_)) => {}
            Some(other) => {
                return Err(StorageError::InvalidDocument(format!(
                    "primary key `{PRIMARY_KEY}` must be a string, got {:?}",
                    other.element_type()
                )));
            }
            None => {
                let key = uuid::Uuid::new_v4().to_string();
                document.insert(PRIMARY_KEY, key.clone());
                result.generated_keys.push(key);
            }
        }

        self.get_collection(db, table)
            .insert_one(to_stored(document))
            .await
            .map_err(backend_error)?;

        Ok(result)
    }

    async fn scan(&self, db: &str, table: &str) -> StorageResult<Cursor> {
        self.find(db, table, doc! {}).await
    }

    async fn get(&self, db: &str, table: &str, id: &str) -> StorageResult<Cursor> {
        Ok(
            self.get_collection(db, table)
                .find_one(doc! { MONGO_KEY: id })
                .await
                .map_err(backend_error)?
                .into_iter()
                .map(from_stored)
                .collect()
        )
    }

    async fn get_all_by_index(&self, db: &str, table: &str, index: &str, value: Bson) -> StorageResult<Cursor> {
        self.find(db, table, doc! { index: value }).await
    }

    async fn update_by_index(
        &self,
        db: &str,
        table: &str,
        index: &str,
        value: Bson,
        patch: Document,
    ) -> StorageResult<WriteResult> {
        let patch = flatten_update(patch)?;
        if patch.is_empty() {
            return Ok(WriteResult::default());
        }

        let response = self.get_collection(db, table)
            .update_many(doc! { index: value }, doc! { "$set": patch })
            .await
            .map_err(backend_error)?;

        Ok(WriteResult {
            updated: response.modified_count,
            unchanged: response.matched_count.saturating_sub(response.modified_count),
            ..WriteResult::default()
        })
    }

    async fn delete(&self, db: &str, table: &str, id: &str) -> StorageResult<WriteResult> {
        let response = self.get_collection(db, table)
            .delete_one(doc! { MONGO_KEY: id })
            .await
            .map_err(backend_error)?;

        Ok(WriteResult { deleted: response.deleted_count, ..WriteResult::default() })
    }

    async fn delete_by_index(&self, db: &str, table: &str, index: &str, value: Bson) -> StorageResult<WriteResult> {
        let response = self.get_collection(db, table)
            .delete_many(doc! { index: value })
            .await
            .map_err(backend_error)?;

        Ok(WriteResult { deleted: response.deleted_count, ..WriteResult::default() })
    }

    async fn contains(&self, db: &str, table: &str, field: &str, value: Bson) -> StorageResult<Cursor> {
        let found = self.get_collection(db, table)
            .find_one(doc! { field: value })
            .projection(doc! { MONGO_KEY: 1 })
            .await
            .map_err(backend_error)?
            .is_some();

        Ok(Cursor::new([Bson::Boolean(found)]))
    }

    async fn shutdown(&self) -> StorageResult<()> {
        self.client.clone().shutdown().await;

        Ok(())
    }
}

/// Connects to MongoDB.
///
/// `address` becomes the connection string (`mongodb://` is prepended when missing),
/// `max_open` and `max_idle` bound the driver's pool and `timeout` bounds both connecting
/// and server selection. The connector pings the server so an unreachable deployment fails
/// here rather than on the first request.
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoDbConnector;

#[async_trait]
impl Connector for MongoDbConnector {
    type Backend = MongoDbStore;

    async fn connect(self, opts: &ConnectOpts) -> StorageResult<Self::Backend> {
        let mut options = ClientOptions::parse(connection_uri(&opts.address).as_str())
            .await
            .map_err(|e| StorageError::Initialization(e.to_string()))?;
        apply_connect_opts(&mut options, opts);

        let client = Client::with_options(options)
            .map_err(|e| StorageError::Initialization(e.to_string()))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StorageError::Initialization(e.to_string()))?;

        tracing::debug!(address = %opts.address, "mongodb deployment reachable");

        Ok(MongoDbStore::new(client))
    }
}
