//! MongoDB driver adapters
//!
//! Every operation opens its own client and drops it before returning, so
//! no connection outlives the command that needed it.

pub mod seed;
pub mod sink;

pub use seed::MongoSeed;
pub use sink::MongoSink;

use mongodb::options::{ClientOptions, ServerAddress};
use mongodb::Client;
use std::time::Duration;

use crate::common::Result;

/// Reported to the server as the client application name
pub const APP_NAME: &str = "rsinit";

/// Client talking to exactly one node, bypassing replica set discovery.
///
/// Required before the set exists: a seeded client would wait for a
/// primary that cannot be elected yet.
pub(crate) fn direct_client(host: &str, port: u16, timeout: Duration) -> Result<Client> {
    let options = ClientOptions::builder()
        .hosts(vec![ServerAddress::Tcp {
            host: host.to_string(),
            port: Some(port),
        }])
        .direct_connection(true)
        .server_selection_timeout(timeout)
        .connect_timeout(timeout)
        .app_name(APP_NAME.to_string())
        .build();
    Ok(Client::with_options(options)?)
}

/// Client for a connection string, bounded by `timeout` for server selection
pub(crate) async fn uri_client(uri: &str, timeout: Duration) -> Result<Client> {
    let mut options = ClientOptions::parse(uri).await?;
    options.server_selection_timeout = Some(timeout);
    options.app_name = Some(APP_NAME.to_string());
    Ok(Client::with_options(options)?)
}
