//! Follows partition writes made by other windows.

use std::sync::Weak;

use tokio::task::JoinHandle;
use tracing::debug;

use storage::partitions::ForeignChanges;

use super::controller::Shared;

pub(super) fn spawn(shared: Weak<Shared>, mut changes: ForeignChanges) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(partitions) = changes.next().await {
            let Some(shared) = shared.upgrade() else {
                break;
            };
            debug!(?partitions, "foreign partition change");
            shared.reload(&partitions).await;
        }
    })
}
