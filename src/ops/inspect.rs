//! Connection check and inventory of a running server

use mongodb::bson::{doc, Document};
use serde::Serialize;

use crate::cluster::admin::SeedAdmin;
use crate::cluster::status::ReplicaSetStatus;
use crate::common::Result;
use crate::mongo::MongoSeed;

#[derive(Debug, Clone, Serialize)]
pub struct CollectionCount {
    pub name: String,
    pub documents: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInventory {
    pub target: String,
    pub version: String,
    pub databases: Vec<String>,
    pub database: String,
    /// Collections of `database`, sorted by name
    pub collections: Vec<CollectionCount>,
    /// `None` until the replica set has been formed
    pub replica_set: Option<ReplicaSetStatus>,
}

impl ServerInventory {
    /// Multi-line operator summary
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("✓ Connected to {}\n", self.target));
        out.push_str(&format!("  Server version: {}\n", self.version));
        if self.databases.is_empty() {
            out.push_str("  Available databases: None\n");
        } else {
            out.push_str(&format!(
                "  Available databases: {}\n",
                self.databases.join(", ")
            ));
        }

        out.push_str(&format!("  Database '{}':\n", self.database));
        if self.collections.is_empty() {
            out.push_str("    No collections found\n");
        }
        for c in &self.collections {
            out.push_str(&format!("    - {}: {} documents\n", c.name, c.documents));
        }

        match &self.replica_set {
            Some(status) => {
                out.push_str(&format!("  Replica set '{}':\n", status.set));
                for m in &status.members {
                    out.push_str(&format!(
                        "    - {} {} ({}){}\n",
                        m.id,
                        m.name,
                        if m.state.is_empty() { "UNKNOWN" } else { m.state.as_str() },
                        if m.is_healthy() { "" } else { " unhealthy" }
                    ));
                }
            }
            None => out.push_str("  Replica set: not formed\n"),
        }
        out
    }
}

fn version_of(build_info: &Document) -> String {
    build_info
        .get_str("version")
        .map(str::to_string)
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Ping `seed`, then collect version, databases and document counts
pub async fn inspect_server(seed: &MongoSeed, database: &str) -> Result<ServerInventory> {
    seed.ping().await?;

    let client = seed.client()?;
    let build_info = client
        .database("admin")
        .run_command(doc! { "buildInfo": 1 })
        .await?;
    let databases = client.list_database_names().await?;

    let db = client.database(database);
    let mut names = db.list_collection_names().await?;
    names.sort();

    let mut collections = Vec::with_capacity(names.len());
    for name in names {
        let documents = db
            .collection::<Document>(&name)
            .count_documents(doc! {})
            .await?;
        collections.push(CollectionCount { name, documents });
    }

    let replica_set = match seed.status().await {
        Ok(status) => Some(status),
        Err(e) => {
            tracing::debug!("replSetGetStatus unavailable: {}", e);
            None
        }
    };

    Ok(ServerInventory {
        target: seed.target(),
        version: version_of(&build_info),
        databases,
        database: database.to_string(),
        collections,
        replica_set,
    })
}
