// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::artifact::ArtifactKind;
use crate::session::SessionId;

fn corr() -> Correlation {
    Correlation::session(SessionId::parse("ses-test"))
}

#[test]
fn event_serializes_with_type_tag() {
    let event = Event::new(corr(), EventKind::CommandAccepted);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "command-accepted");
    assert_eq!(json["correlation"]["sessionId"], "ses-test");
}

#[test]
fn completed_event_renders_outcome_as_string() {
    let event = Event::new(corr(), EventKind::success());
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "command-completed");
    assert_eq!(json["outcome"], "success");
    assert!(json.get("message").is_none());
    assert!(json.get("errorCode").is_none());
}

#[test]
fn failure_shorthand_carries_message() {
    let kind = EventKind::failure("no adapter");
    match kind {
        EventKind::CommandCompleted { outcome, message, error_code } => {
            assert_eq!(outcome, Outcome::Failure);
            assert_eq!(message.as_deref(), Some("no adapter"));
            assert!(error_code.is_none());
        }
        other => panic!("unexpected kind: {:?}", other),
    }
}

#[test]
fn throttled_event_omits_infinite_retry() {
    let event = Event::new(
        corr(),
        EventKind::Throttled { scope: "Rate limit exceeded".into(), retry_after_ms: None },
    );
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "throttled");
    assert!(json.get("retryAfterMs").is_none());
}

#[test]
fn status_change_uses_camel_cased_fields() {
    let event = Event::new(
        corr(),
        EventKind::SessionStatusChanged {
            status: SessionStatus::NeedsApproval,
            reason: Some("push requested".into()),
        },
    );
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["status"], "NeedsApproval");
    assert_eq!(json["reason"], "push requested");
}

#[test]
fn artifact_event_roundtrips() {
    let artifact = Artifact::inline(ArtifactKind::Diff, "changes.diff", "--- a\n+++ b\n");
    let event = Event::new(corr(), EventKind::ArtifactAvailable { artifact });
    let json = serde_json::to_string(&event).unwrap();
    let parsed: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, event);
}

#[test]
fn terminal_kind_classification() {
    assert!(EventKind::success().is_terminal_for_command());
    assert!(EventKind::CommandRejected { reason: "x".into(), policy_rule: None }
        .is_terminal_for_command());
    assert!(EventKind::Throttled { scope: "x".into(), retry_after_ms: Some(1) }
        .is_terminal_for_command());
    assert!(!EventKind::CommandAccepted.is_terminal_for_command());
}
