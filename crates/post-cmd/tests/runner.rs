//! End-to-end tests for the JSON-lines runner over the in-memory store.

use domain::post_dispatcher;
use event_store::{AggregateId, EventStore, InMemoryEventStore, Version};
use post_cmd::{Outcome, RejectReason, Summary, process, process_line};

#[tokio::test]
async fn processes_each_line_and_reports_outcomes() {
    let store = InMemoryEventStore::in_memory();
    let dispatcher = post_dispatcher(store.clone()).unwrap();
    let post_id = AggregateId::new();
    let input = format!(
        r#"{{"command": "CreatePost", "post_id": "{post_id}", "author": "alice", "message": "hello"}}

{{"command": "LikePost", "post_id": "{post_id}"}}
{{"command": "RemovePost", "post_id": "{post_id}", "username": "bob"}}
not json
"#
    );
    let mut output = Vec::new();

    let summary = process(&dispatcher, input.as_bytes(), &mut output)
        .await
        .unwrap();

    assert_eq!(
        summary,
        Summary {
            accepted: 2,
            rejected: 2
        }
    );
    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["status"], "accepted");
    assert_eq!(lines[0]["events"], serde_json::json!(["PostCreated"]));
    assert_eq!(lines[1]["version"], 2);
    assert_eq!(lines[2]["status"], "rejected");
    assert_eq!(lines[2]["reason"], "validation");
    assert_eq!(lines[3]["reason"], "malformed");

    assert_eq!(store.read(post_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn command_on_unknown_post_is_not_found() {
    let dispatcher = post_dispatcher(InMemoryEventStore::in_memory()).unwrap();
    let line = format!(r#"{{"command": "LikePost", "post_id": "{}"}}"#, AggregateId::new());

    let outcome = process_line(&dispatcher, &line).await;

    assert!(matches!(
        outcome,
        Outcome::Rejected {
            reason: RejectReason::NotFound,
            ..
        }
    ));
}

#[tokio::test]
async fn accepted_outcome_carries_version() {
    let dispatcher = post_dispatcher(InMemoryEventStore::in_memory()).unwrap();
    let post_id = AggregateId::new();
    let line = format!(
        r#"{{"command": "CreatePost", "post_id": "{post_id}", "author": "alice", "message": "hello"}}"#
    );

    let outcome = process_line(&dispatcher, &line).await;

    assert_eq!(
        outcome,
        Outcome::Accepted {
            post_id,
            version: Version::first(),
            events: vec!["PostCreated"],
        }
    );
}
