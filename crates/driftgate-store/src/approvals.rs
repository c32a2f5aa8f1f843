//! Durable per-endpoint approval state machine
//!
//! Tracks, per endpoint-key: the approval status (`absent | waiting |
//! approved`), at most one staged candidate shape, and the cached
//! notification payload for later in-place edits.
//!
//! Allowed transitions:
//! - `absent/waiting -> waiting` via [`ApprovalStore::defer`] (idempotent)
//! - `* -> approved` via [`ApprovalStore::approve`], only after PIN
//!   verification; a wrong PIN never mutates state
//!
//! Promotion order on approve: the canonical schema file is written first,
//! then the pending entry is deleted. The two writes are not atomic; a crash
//! in between leaves the candidate retrievable, never lost.

use std::collections::BTreeMap;
use std::path::Path;

use driftgate_core::errors::{DgError, DgErrorKind};
use driftgate_core::schema::shape_digest;
use driftgate_core_types::{EndpointKey, Sensitive};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db;
use crate::errors::Result;
use crate::kv::{KvStore, ITEM_NONE, SCOPE_APPROVALS, SCOPE_LAST_RUN, SCOPE_PENDING, SCOPE_RAW_BLOCKS};
use crate::schema_files::SchemaDir;

/// Approval status of one endpoint-key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Drift acknowledged, decision explicitly postponed
    Waiting,
    /// Candidate accepted; PIN was verified
    Approved,
}

/// Cached notification payload for one endpoint-key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedNotification {
    /// Rendered block payload as it was delivered
    pub payload: Value,
    /// Channel-specific identifier of the delivered message
    pub message_id: String,
}

/// Side effects owed after a successful approval
///
/// The state machine itself only mutates durable state; the caller runs the
/// external effects (rerun trigger, notification edit).
#[derive(Debug, Clone)]
pub struct ApproveEffects {
    /// The shape that was promoted to canonical, if a candidate was staged
    pub promoted_shape: Option<Value>,
    /// Fingerprint of the promoted shape, for logging
    pub promoted_digest: Option<String>,
    /// Cached notification to re-render without its interactive controls
    pub notification: Option<CachedNotification>,
    /// Identity that approved, for the approved-by marker
    pub approved_by: String,
}

/// Durable approval store over SQLite state and file-based schemas
pub struct ApprovalStore {
    conn: Connection,
    schemas: SchemaDir,
    pin: Sensitive<String>,
}

impl ApprovalStore {
    /// Open the store at a database path with the given schema directory
    pub fn open<P: AsRef<Path>>(
        db_path: P,
        schemas: SchemaDir,
        pin: Sensitive<String>,
    ) -> Result<Self> {
        let conn = db::open(db_path)?;
        db::configure(&conn)?;
        KvStore::ensure_schema(&conn)?;
        Ok(Self { conn, schemas, pin })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory(schemas: SchemaDir, pin: Sensitive<String>) -> Result<Self> {
        let conn = db::open_in_memory()?;
        KvStore::ensure_schema(&conn)?;
        Ok(Self { conn, schemas, pin })
    }

    /// Close the store, releasing the connection
    pub fn close(self) {
        // Connection closes on drop; explicit method marks the lifecycle end.
        drop(self.conn);
    }

    /// Access the schema directory backing this store
    pub fn schemas(&self) -> &SchemaDir {
        &self.schemas
    }

    // ===== Candidate staging =====

    /// Stage (or overwrite) the pending candidate shape for a key
    ///
    /// Last write wins; the approval record is unaffected.
    pub fn stage_candidate(&self, key: &EndpointKey, shape: &Value) -> Result<()> {
        KvStore::put(&self.conn, SCOPE_PENDING, key.as_str(), shape)?;
        tracing::debug!(
            endpoint_key = key.as_str(),
            shape_digest = shape_digest(shape),
            "staged candidate shape"
        );
        Ok(())
    }

    /// Read the pending candidate for a key, if any
    pub fn pending_candidate(&self, key: &EndpointKey) -> Result<Option<Value>> {
        KvStore::get(&self.conn, SCOPE_PENDING, key.as_str())
    }

    // ===== Approval record =====

    /// Explicitly postpone the decision for a key (idempotent)
    pub fn defer(&self, key: &EndpointKey) -> Result<()> {
        let mut record = self.load_record()?;
        record.insert(key.as_str().to_string(), ApprovalStatus::Waiting);
        self.store_record(&record)
    }

    /// Approve the staged candidate for a key after PIN verification
    ///
    /// On a PIN match: promotes the pending candidate (if any) to the
    /// canonical expected schema, removes the pending entry, marks the key
    /// approved, and returns the side effects owed by the caller.
    ///
    /// # Errors
    ///
    /// Returns `DgErrorKind::Validation` on a PIN mismatch; no state is
    /// mutated in that case.
    pub fn approve(
        &self,
        key: &EndpointKey,
        supplied_pin: &str,
        identity: &str,
    ) -> Result<ApproveEffects> {
        if supplied_pin != self.pin.expose() {
            tracing::warn!(
                endpoint_key = key.as_str(),
                identity = identity,
                "approval rejected: PIN mismatch"
            );
            return Err(DgError::new(DgErrorKind::Validation)
                .with_op("approve")
                .with_endpoint_key(key.clone())
                .with_message("PIN verification failed"));
        }

        // Promote the staged candidate, if one exists. Canonical write comes
        // first so a crash between the two writes leaves the candidate
        // retrievable rather than lost.
        let pending = self.pending_candidate(key)?;
        let (promoted_shape, promoted_digest) = match pending {
            Some(shape) => {
                self.schemas.write_canonical(key.as_str(), &shape)?;
                KvStore::delete(&self.conn, SCOPE_PENDING, key.as_str())?;
                let digest = shape_digest(&shape);
                (Some(shape), Some(digest))
            }
            None => (None, None),
        };

        let mut record = self.load_record()?;
        record.insert(key.as_str().to_string(), ApprovalStatus::Approved);
        self.store_record(&record)?;

        let notification = self.cached_notification(key)?;

        tracing::info!(
            endpoint_key = key.as_str(),
            identity = identity,
            promoted = promoted_shape.is_some(),
            "approval recorded"
        );

        Ok(ApproveEffects {
            promoted_shape,
            promoted_digest,
            notification,
            approved_by: identity.to_string(),
        })
    }

    /// Move every currently known key to `waiting` (none are removed)
    ///
    /// Known = keys in the approval record plus keys with a staged
    /// candidate. Cached notifications are untouched.
    pub fn reset_approvals(&self) -> Result<()> {
        let mut record = self.load_record()?;
        for key in record.keys().cloned().collect::<Vec<_>>() {
            record.insert(key, ApprovalStatus::Waiting);
        }
        for (key, _) in KvStore::list(&self.conn, SCOPE_PENDING)? {
            record.insert(key, ApprovalStatus::Waiting);
        }
        self.store_record(&record)
    }

    /// Approval status of one key, if recorded
    pub fn approval_status(&self, key: &EndpointKey) -> Result<Option<ApprovalStatus>> {
        Ok(self.load_record()?.get(key.as_str()).copied())
    }

    // ===== Cached notifications =====

    /// Cache the delivered notification payload for later edits
    pub fn cache_notification(
        &self,
        key: &EndpointKey,
        notification: &CachedNotification,
    ) -> Result<()> {
        let value = serde_json::to_value(notification)
            .map_err(|e| crate::errors::serde_error("cache_notification", e))?;
        KvStore::put(&self.conn, SCOPE_RAW_BLOCKS, key.as_str(), &value)
    }

    /// Read the cached notification for a key, if any
    pub fn cached_notification(&self, key: &EndpointKey) -> Result<Option<CachedNotification>> {
        match KvStore::get(&self.conn, SCOPE_RAW_BLOCKS, key.as_str())? {
            Some(value) => {
                let cached = serde_json::from_value(value)
                    .map_err(|e| crate::errors::serde_error("cached_notification", e))?;
                Ok(Some(cached))
            }
            None => Ok(None),
        }
    }

    // ===== Run metadata =====

    /// Record the completion timestamp of a run (ISO 8601)
    pub fn set_last_run_timestamp(&self, timestamp: &chrono::DateTime<chrono::Utc>) -> Result<()> {
        KvStore::put(
            &self.conn,
            SCOPE_LAST_RUN,
            ITEM_NONE,
            &Value::String(timestamp.to_rfc3339()),
        )
    }

    /// Read the last recorded run timestamp, if any
    pub fn last_run_timestamp(&self) -> Result<Option<String>> {
        Ok(KvStore::get(&self.conn, SCOPE_LAST_RUN, ITEM_NONE)?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    // ===== Debug dumps =====

    /// Dump the full approval record
    pub fn dump_approvals(&self) -> Result<BTreeMap<String, ApprovalStatus>> {
        self.load_record()
    }

    /// Dump all staged candidates
    pub fn dump_pending(&self) -> Result<BTreeMap<String, Value>> {
        Ok(KvStore::list(&self.conn, SCOPE_PENDING)?
            .into_iter()
            .collect())
    }

    /// Dump all cached notifications
    pub fn dump_notifications(&self) -> Result<BTreeMap<String, CachedNotification>> {
        let mut result = BTreeMap::new();
        for (key, value) in KvStore::list(&self.conn, SCOPE_RAW_BLOCKS)? {
            let cached = serde_json::from_value(value)
                .map_err(|e| crate::errors::serde_error("dump_notifications", e))?;
            result.insert(key, cached);
        }
        Ok(result)
    }

    // ===== Internals =====

    fn load_record(&self) -> Result<BTreeMap<String, ApprovalStatus>> {
        match KvStore::get(&self.conn, SCOPE_APPROVALS, ITEM_NONE)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| crate::errors::serde_error("load_approvals", e)),
            None => Ok(BTreeMap::new()),
        }
    }

    fn store_record(&self, record: &BTreeMap<String, ApprovalStatus>) -> Result<()> {
        let value = serde_json::to_value(record)
            .map_err(|e| crate::errors::serde_error("store_approvals", e))?;
        KvStore::put(&self.conn, SCOPE_APPROVALS, ITEM_NONE, &value)
    }
}
