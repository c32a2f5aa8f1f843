//! Durability tests: approval state must survive a store reopen.

use driftgate_core_types::{EndpointKey, Sensitive};
use driftgate_store::{ApprovalStatus, ApprovalStore, CachedNotification, SchemaDir};
use serde_json::json;
use tempfile::TempDir;

const PIN: &str = "8080";

fn open_store(tmp: &TempDir) -> ApprovalStore {
    let schemas = SchemaDir::open(tmp.path().join("schemas")).unwrap();
    ApprovalStore::open(
        tmp.path().join("state.db"),
        schemas,
        Sensitive::new(PIN.to_string()),
    )
    .unwrap()
}

#[test]
fn test_staged_candidate_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let key = EndpointKey::from_name("List Orders");
    let shape = json!({"orders": [{"id": "number"}]});

    {
        let store = open_store(&tmp);
        store.stage_candidate(&key, &shape).unwrap();
        store.close();
    }

    let store = open_store(&tmp);
    assert_eq!(store.pending_candidate(&key).unwrap(), Some(shape));
}

#[test]
fn test_approval_record_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let waiting = EndpointKey::from_name("A");
    let approved = EndpointKey::from_name("B");

    {
        let store = open_store(&tmp);
        store.defer(&waiting).unwrap();
        store.stage_candidate(&approved, &json!({"x": "string"})).unwrap();
        store.approve(&approved, PIN, "alice").unwrap();
        store.close();
    }

    let store = open_store(&tmp);
    assert_eq!(
        store.approval_status(&waiting).unwrap(),
        Some(ApprovalStatus::Waiting)
    );
    assert_eq!(
        store.approval_status(&approved).unwrap(),
        Some(ApprovalStatus::Approved)
    );
    // The promoted canonical schema is on disk, the pending entry is gone.
    assert_eq!(
        store.schemas().read_expected(approved.as_str()).unwrap(),
        json!({"x": "string"})
    );
    assert_eq!(store.pending_candidate(&approved).unwrap(), None);
}

#[test]
fn test_cached_notifications_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let key = EndpointKey::from_name("C");
    let cached = CachedNotification {
        payload: json!([{"type": "section", "text": "drift"}]),
        message_id: "msg-42".to_string(),
    };

    {
        let store = open_store(&tmp);
        store.cache_notification(&key, &cached).unwrap();
        store.close();
    }

    let store = open_store(&tmp);
    assert_eq!(store.cached_notification(&key).unwrap(), Some(cached));
}

#[test]
fn test_promotion_order_keeps_candidate_retrievable() {
    // The canonical file is written before the pending entry is deleted, so
    // at every point of the sequence the shape exists in at least one place.
    let tmp = TempDir::new().unwrap();
    let key = EndpointKey::from_name("D");
    let shape = json!({"v": "number"});

    let store = open_store(&tmp);
    store.stage_candidate(&key, &shape).unwrap();
    store.approve(&key, PIN, "alice").unwrap();

    // After the full sequence: canonical holds the shape, pending is clear.
    assert_eq!(store.schemas().read_expected(key.as_str()).unwrap(), shape);
    assert_eq!(store.pending_candidate(&key).unwrap(), None);
}
