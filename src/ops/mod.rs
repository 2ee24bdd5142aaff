//! Ops commands: dataset loading and server inspection

pub mod dataset;
pub mod inspect;
pub mod load;

pub use dataset::{Dataset, DatasetSource};
pub use inspect::{inspect_server, CollectionCount, ServerInventory};
pub use load::{load, load_all, DatasetOutcome, DatasetSink, LoadReport};
