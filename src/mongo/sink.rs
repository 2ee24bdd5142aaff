//! Drop-then-insert sink backed by the MongoDB driver

use async_trait::async_trait;
use mongodb::bson::Document;
use serde_json::Value;
use std::time::Duration;

use super::uri_client;
use crate::common::{Error, Result};
use crate::ops::load::DatasetSink;

#[derive(Debug, Clone)]
pub struct MongoSink {
    database: String,
    connect_timeout: Duration,
}

impl MongoSink {
    pub fn new(database: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            database: database.into(),
            connect_timeout,
        }
    }
}

fn to_documents(collection: &str, records: &[Value]) -> Result<Vec<Document>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            mongodb::bson::to_document(record).map_err(|e| Error::MalformedRecord {
                dataset: collection.to_string(),
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl DatasetSink for MongoSink {
    async fn replace(&self, uri: &str, collection: &str, records: &[Value]) -> Result<u64> {
        // convert first: a bad record must not cost the existing contents
        let documents = to_documents(collection, records)?;

        let client = uri_client(uri, self.connect_timeout).await?;
        let target = client
            .database(&self.database)
            .collection::<Document>(collection);

        target.drop().await?;
        tracing::debug!("Dropped {}.{}", self.database, collection);

        if documents.is_empty() {
            tracing::info!("No records for '{}', collection left empty", collection);
            return Ok(0);
        }

        let result = target.insert_many(documents).await?;
        Ok(result.inserted_ids.len() as u64)
    }
}
