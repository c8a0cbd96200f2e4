//! Object migration between nodes.
//!
//! Each key moves as read from the old owner, write to the new owner,
//! delete from the old owner. The source copy is only deleted after the
//! write succeeded, so a failure part way never loses the object; at worst
//! the ring points at a node that does not have it yet. The administrator
//! retries with `AdminService::rebalance` after an add or
//! `AdminService::drain` after a remove.

use std::ops::AddAssign;

use metrics::counter;
use tracing::{debug, warn};

use crate::client::NodeClient;
use crate::error::ClusterResult;

/// Outcome of one membership change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Keys inspected.
    pub scanned: usize,
    /// Keys fully moved (read, write and delete all succeeded).
    pub migrated: usize,
    /// Keys whose move failed at some step.
    pub failed: usize,
    /// Source nodes whose keys could not be listed.
    pub unreachable: usize,
}

impl AddAssign for MigrationReport {
    fn add_assign(&mut self, other: Self) {
        self.scanned += other.scanned;
        self.migrated += other.migrated;
        self.failed += other.failed;
        self.unreachable += other.unreachable;
    }
}

/// Move one key from `from` to `to`.
pub async fn migrate_key(key: &str, from: &NodeClient, to: &NodeClient) -> ClusterResult<()> {
    let data = from.read_file(key).await?;
    to.write_file(key, data).await?;
    from.delete_file(key).await?;
    debug!(key, from = %from.addr(), to = %to.addr(), "migrated");
    Ok(())
}

/// Move one key and fold the outcome into `report`.
pub(crate) async fn migrate_and_record(
    key: &str,
    from: &NodeClient,
    to: &NodeClient,
    report: &mut MigrationReport,
) {
    match migrate_key(key, from, to).await {
        Ok(()) => {
            report.migrated += 1;
            counter!("cluster_migrated_keys_total").increment(1);
        }
        Err(e) => {
            report.failed += 1;
            counter!("cluster_migration_failures_total").increment(1);
            warn!(key, from = %from.addr(), to = %to.addr(), error = %e, "migration failed");
        }
    }
}
