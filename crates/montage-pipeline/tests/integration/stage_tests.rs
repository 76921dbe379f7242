//! Stage-to-stage runs through the runner dispatch.

use serde_json::json;

use montage_pipeline::{run_stage, PipelineError, Stage, ValidationError};

use super::support::*;

#[tokio::test]
async fn test_full_pipeline() {
    let h = Harness::new();
    h.detector.set_hits(&[2, 3, 9]);
    h.add_track("anthem.mp3");
    let ctx = h.context();
    let config = ctx.config.clone();

    let trigger = json!({
        "bucket": BUCKET,
        "videoKey": VIDEO_KEY,
        "detectorRef": MODEL_REF,
        "jobId": "run-42"
    });

    let validated = run_stage(Stage::Validate, trigger, &config, None).await.unwrap();
    assert_eq!(validated["email"], EMAIL);

    let detections = run_stage(Stage::Sample, validated, &config, Some(&ctx))
        .await
        .unwrap();
    assert_eq!(detections["totalDetections"], 3);

    let merged = run_stage(Stage::Merge, detections, &config, None).await.unwrap();
    assert_eq!(merged["intervals"], json!([{"start": 0.0, "end": 12.0}]));

    let composed = run_stage(Stage::Compose, merged, &config, Some(&ctx))
        .await
        .unwrap();

    assert_eq!(composed["montageKey"], MONTAGE_KEY);
    assert_eq!(composed["jobId"], "run-42");
    assert_eq!(composed["totalClips"], 1);
    assert_eq!(composed["clips"][0]["clipNumber"], 1);
    assert_eq!(composed["clips"][0]["commentary"], COMMENTARY);
    assert_eq!(composed["clips"][0]["montageKey"], MONTAGE_KEY);
    assert!(composed.get("intervals").is_none());

    assert_eq!(h.ledger.records().len(), 1);
    assert!(h.store.object(BUCKET, MONTAGE_KEY).is_some());
    assert!(h.scratch_is_clean());
}

#[tokio::test]
async fn test_quiet_video_publishes_nothing() {
    let h = Harness::new();
    let ctx = h.context();
    let config = ctx.config.clone();

    let validated = run_stage(
        Stage::Validate,
        json!({"bucket": BUCKET, "videoKey": VIDEO_KEY, "modelArn": MODEL_REF}),
        &config,
        None,
    )
    .await
    .unwrap();
    let detections = run_stage(Stage::Sample, validated, &config, Some(&ctx))
        .await
        .unwrap();
    let merged = run_stage(Stage::Merge, detections, &config, None).await.unwrap();
    assert_eq!(merged["totalIntervals"], 0);

    let requests_before = h.store.request_count();
    let composed = run_stage(Stage::Compose, merged, &config, Some(&ctx))
        .await
        .unwrap();

    assert_eq!(composed["totalClips"], 0);
    assert!(composed.get("montageKey").is_none());
    assert_eq!(h.store.request_count(), requests_before);
    assert_eq!(h.ledger.attempts(), 0);
}

#[tokio::test]
async fn test_missing_detector_ref_is_rejected() {
    let h = Harness::new();

    let err = run_stage(
        Stage::Validate,
        json!({"bucket": BUCKET, "videoKey": VIDEO_KEY, "detectorRef": ""}),
        &h.config(),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::MissingField("detectorRef"))
    ));
    assert_eq!(err.to_string(), "Missing required field: detectorRef");
}

#[tokio::test]
async fn test_merge_accepts_legacy_detection_output() {
    let h = Harness::new();

    let merged = run_stage(
        Stage::Merge,
        json!({
            "bucket": BUCKET,
            "videoKey": VIDEO_KEY,
            "email": EMAIL,
            "killTimestamps": [{"time": 2.0, "confidence": 88.0}],
            "totalDetections": 1
        }),
        &h.config(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(merged["intervals"], json!([{"start": 0.0, "end": 5.0}]));
    assert_eq!(merged["totalIntervals"], 1);
}
