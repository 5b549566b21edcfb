#![forbid(unsafe_code)]

pub mod partitions;
pub mod repository;
pub mod sqlite;

pub use partitions::SessionPartitions;
pub use repository::{
    InMemorySessionStore, InstanceId, Partition, PartitionChange, SessionStore, Storage,
    StorageError, StoredPartition,
};
