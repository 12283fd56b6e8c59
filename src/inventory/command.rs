//! Command-backed inventory source
//!
//! Runs the site query helper and parses its output. The helper is invoked
//! as:
//!
//! ```text
//! <program> pending    <src_resc> <dest_resc> [collection]
//! <program> replicated <src_resc> <dest_resc> [collection]
//! ```
//!
//! and prints one `<size> <path>` line per data object. `pending` lists the
//! objects to move; `replicated` lists the objects already present on both
//! resources (only the count is used).

use crate::error::{InventoryError, InventoryResult};
use crate::inventory::{parse_listing, InventorySource, WorkItem};
use std::process::Command;
use tracing::debug;

/// Query mode passed as the helper's first argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryMode {
    /// Objects on source with no replica on destination
    Pending,

    /// Objects with a replica on both resources
    Replicated,
}

impl QueryMode {
    fn as_arg(self) -> &'static str {
        match self {
            QueryMode::Pending => "pending",
            QueryMode::Replicated => "replicated",
        }
    }
}

/// Inventory source backed by an external query command
#[derive(Debug, Clone)]
pub struct CommandInventory {
    /// Program to invoke
    program: String,
}

impl CommandInventory {
    /// Create an inventory source around the given helper program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run one query and return the raw stdout listing
    fn query(
        &self,
        mode: QueryMode,
        src_resc: &str,
        dest_resc: &str,
        collection: Option<&str>,
    ) -> InventoryResult<String> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(mode.as_arg()).arg(src_resc).arg(dest_resc);
        if let Some(coll) = collection {
            cmd.arg(coll);
        }

        debug!(
            program = %self.program,
            mode = mode.as_arg(),
            src = src_resc,
            dest = dest_resc,
            collection = collection.unwrap_or("<all>"),
            "Running inventory query"
        );

        let output = cmd.output().map_err(|e| InventoryError::SpawnFailed {
            program: self.program.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(InventoryError::QueryFailed {
                program: self.program.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl InventorySource for CommandInventory {
    fn pending(
        &self,
        src_resc: &str,
        dest_resc: &str,
        collection: Option<&str>,
    ) -> InventoryResult<Vec<WorkItem>> {
        let listing = self.query(QueryMode::Pending, src_resc, dest_resc, collection)?;
        let items = parse_listing(&listing)?;
        debug!(count = items.len(), "Inventory fetched");
        Ok(items)
    }

    fn replicated_count(
        &self,
        src_resc: &str,
        dest_resc: &str,
        collection: Option<&str>,
    ) -> InventoryResult<u64> {
        let listing = self.query(QueryMode::Replicated, src_resc, dest_resc, collection)?;
        // Only the count matters here; still parse to reject garbage output
        let items = parse_listing(&listing)?;
        Ok(items.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mode_args() {
        assert_eq!(QueryMode::Pending.as_arg(), "pending");
        assert_eq!(QueryMode::Replicated.as_arg(), "replicated");
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let inv = CommandInventory::new("/nonexistent/igrid-inventory");
        let err = inv.pending("r1", "r2", None).unwrap_err();
        assert!(matches!(err, InventoryError::SpawnFailed { .. }));
    }
}
