//! Admin commands against the seed node

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::Client;
use std::time::Duration;

use super::direct_client;
use crate::cluster::admin::SeedAdmin;
use crate::cluster::status::ReplicaSetStatus;
use crate::cluster::topology::ClusterDescriptor;
use crate::common::Result;

/// Seed node reached over a direct connection
#[derive(Debug, Clone)]
pub struct MongoSeed {
    host: String,
    port: u16,
    timeout: Duration,
}

impl MongoSeed {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Fresh client for one command; dropped by the caller when done
    pub fn client(&self) -> Result<Client> {
        direct_client(&self.host, self.port, self.timeout)
    }

    async fn admin_command(&self, command: Document) -> Result<Document> {
        let client = self.client()?;
        let reply = client.database("admin").run_command(command).await?;
        Ok(reply)
    }
}

#[async_trait]
impl SeedAdmin for MongoSeed {
    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn ping(&self) -> Result<()> {
        self.admin_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn initiate(&self, descriptor: &ClusterDescriptor) -> Result<()> {
        let config = descriptor.to_document();
        tracing::debug!("replSetInitiate {}", config);
        self.admin_command(doc! { "replSetInitiate": config }).await?;
        Ok(())
    }

    async fn status(&self) -> Result<ReplicaSetStatus> {
        let reply = self.admin_command(doc! { "replSetGetStatus": 1 }).await?;
        ReplicaSetStatus::from_document(reply)
    }
}
