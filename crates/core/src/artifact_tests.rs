// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn inline_artifact_prefers_inline_source() {
    let artifact = Artifact::inline(ArtifactKind::Diff, "changes.diff", "--- a\n+++ b\n");
    match artifact.source() {
        Some(ArtifactSource::Inline(text)) => assert!(text.starts_with("--- a")),
        other => panic!("unexpected source: {:?}", other),
    }
}

#[test]
fn path_artifact_resolves_to_path() {
    let artifact = Artifact::at_path(ArtifactKind::BuildLog, "build.log", "/ws/build.log");
    match artifact.source() {
        Some(ArtifactSource::Path(path)) => assert_eq!(path, Path::new("/ws/build.log")),
        other => panic!("unexpected source: {:?}", other),
    }
}

#[test]
fn carrierless_artifact_is_tolerated() {
    let mut artifact = Artifact::inline(ArtifactKind::Log, "empty", "");
    artifact.inline_text = None;
    assert_eq!(artifact.source(), None);
}

#[test]
fn inline_wins_over_path_when_both_are_set() {
    let mut artifact = Artifact::inline(ArtifactKind::TestResults, "results", "ok");
    artifact.path_hint = Some(PathBuf::from("/ws/results.txt"));
    assert!(matches!(artifact.source(), Some(ArtifactSource::Inline("ok"))));
}

#[test]
fn kind_serializes_kebab_case() {
    let json = serde_json::to_value(ArtifactKind::TestResults).unwrap();
    assert_eq!(json, "test-results");
    let json = serde_json::to_value(ArtifactKind::ErrorReport).unwrap();
    assert_eq!(json, "error-report");
}

#[test]
fn artifact_serde_omits_absent_carriers() {
    let artifact = Artifact::at_uri(ArtifactKind::Plan, "plan.json", "https://example/plan");
    let json = serde_json::to_value(&artifact).unwrap();
    assert_eq!(json["downloadUri"], "https://example/plan");
    assert!(json.get("inlineText").is_none());
    assert!(json.get("pathHint").is_none());
}
