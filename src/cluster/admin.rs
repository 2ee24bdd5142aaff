//! Administrative commands against the seed node

use async_trait::async_trait;

use crate::cluster::status::ReplicaSetStatus;
use crate::cluster::topology::ClusterDescriptor;
use crate::common::Result;

/// Command surface the bootstrap needs from the seed node.
///
/// Implemented over the MongoDB driver by
/// [`MongoSeed`](crate::mongo::MongoSeed); tests plug in fakes.
#[async_trait]
pub trait SeedAdmin: Send + Sync {
    /// Address used in logs and errors
    fn target(&self) -> String;

    /// Liveness probe (`ping`)
    async fn ping(&self) -> Result<()>;

    /// Submit `replSetInitiate` with the full member list
    async fn initiate(&self, descriptor: &ClusterDescriptor) -> Result<()>;

    /// `replSetGetStatus`
    async fn status(&self) -> Result<ReplicaSetStatus>;
}
