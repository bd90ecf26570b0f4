// src/mongo.rs
use async_trait::async_trait;
use bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};

use crate::error::{Result, Sas2MongoError};
use crate::sink::DocumentSink;

/// Builds a connection string for a bare host and port.
pub fn host_uri(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("mongodb://[{}]:{}", host, port)
    } else {
        format!("mongodb://{}:{}", host, port)
    }
}

/// Hides the user-info part of a connection string.
pub fn redact_uri(uri: &str) -> String {
    let Some(scheme_end) = uri.find("://") else {
        return uri.to_string();
    };
    let rest = &uri[scheme_end + 3..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}://***@{}", &uri[..scheme_end], &rest[at + 1..]),
        None => uri.to_string(),
    }
}

/// A MongoDB collection opened for the run.
///
/// The client behind it is released with [`MongoSink::shutdown`].
pub struct MongoSink {
    client: Client,
    collection: Collection<Document>,
}

pub async fn connect(uri: &str, db: &str, collection: &str) -> Result<MongoSink> {
    let mut client_options = ClientOptions::parse(uri).await.map_err(|e| {
        Sas2MongoError::database(format!("Invalid connection string {}", redact_uri(uri)), e)
    })?;
    client_options.app_name = Some("sas2mongo".to_string());
    let client = Client::with_options(client_options)
        .map_err(|e| Sas2MongoError::database("Failed to create MongoDB client", e))?;
    let db = client.database(db);
    Ok(MongoSink {
        collection: db.collection::<Document>(collection),
        client,
    })
}

impl MongoSink {
    /// `database.collection`
    pub fn namespace(&self) -> String {
        self.collection.namespace().to_string()
    }

    /// Closes every connection held by the client.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[async_trait]
impl DocumentSink for MongoSink {
    async fn count(&self) -> Result<u64> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| Sas2MongoError::database(format!("Failed to count {}", self.namespace()), e))
    }

    async fn clear(&mut self) -> Result<()> {
        self.collection
            .drop()
            .await
            .map_err(|e| Sas2MongoError::database(format!("Failed to drop {}", self.namespace()), e))
    }

    async fn insert(&mut self, document: Document) -> Result<()> {
        self.collection
            .insert_one(document)
            .await
            .map(|_| ())
            .map_err(|e| {
                Sas2MongoError::database(format!("Failed to insert into {}", self.namespace()), e)
            })
    }
}
