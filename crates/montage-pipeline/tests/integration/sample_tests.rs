//! Frame sampler tests.

use montage_models::{JobId, ValidatedEnvelope};
use montage_pipeline::{sample_and_detect, ErrorKind};
use montage_storage::ObjectStore;

use super::support::*;

fn validated() -> ValidatedEnvelope {
    ValidatedEnvelope {
        source: source(),
        detector_ref: MODEL_REF.to_string(),
        job_id: Some(JobId::from_string("run-42")),
    }
}

fn times(envelope: &montage_models::DetectionEnvelope) -> Vec<f64> {
    envelope.detections.iter().map(|d| d.time).collect()
}

#[tokio::test]
async fn test_detections_are_stamped_with_the_frame_second() {
    let h = Harness::new();
    h.detector.set_hits(&[2, 3, 9]);

    let envelope = sample_and_detect(&h.context(), validated()).await.unwrap();

    assert_eq!(times(&envelope), vec![2.0, 3.0, 9.0]);
    assert!(envelope.detections.iter().all(|d| d.confidence == 92.0));
    assert_eq!(envelope.total_detections, 3);
    assert_eq!(envelope.source, source());
    assert_eq!(envelope.detector_ref, MODEL_REF);
    assert_eq!(envelope.job_id, Some(JobId::from_string("run-42")));

    assert_eq!(h.detector.calls(), 12);
    assert!(h.detector.model_refs().iter().all(|m| m == MODEL_REF));
    assert_eq!(h.media.calls_of(Step::Frames).len(), 1);
    assert!(h.scratch_is_clean());
}

#[tokio::test]
async fn test_nothing_detected() {
    let h = Harness::new();

    let envelope = sample_and_detect(&h.context(), validated()).await.unwrap();

    assert!(envelope.detections.is_empty());
    assert_eq!(envelope.total_detections, 0);
}

#[tokio::test]
async fn test_failed_frame_is_skipped() {
    let h = Harness::new();
    h.detector.set_hits(&[2, 3, 9]);
    h.detector.fail_frame(3);

    let envelope = sample_and_detect(&h.context(), validated()).await.unwrap();

    assert_eq!(times(&envelope), vec![2.0, 9.0]);
    assert_eq!(h.detector.calls(), 12);
}

#[tokio::test]
async fn test_custom_sentinel_label() {
    let h = Harness::new();
    h.detector.set_hits(&[4]);
    let ctx = h.context_with(|c| c.sentinel_label = "spike".to_string());

    let envelope = sample_and_detect(&ctx, validated()).await.unwrap();

    assert_eq!(times(&envelope), vec![4.0]);
    assert_eq!(envelope.detections[0].confidence, 99.0);
}

#[tokio::test]
async fn test_missing_source_video_is_fatal() {
    let h = Harness::new();
    h.store.delete(BUCKET, VIDEO_KEY).await.unwrap();

    let err = sample_and_detect(&h.context(), validated()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalStage);
    assert!(h.media.calls().is_empty());
    assert_eq!(h.detector.calls(), 0);
    assert!(h.scratch_is_clean());
}

#[tokio::test]
async fn test_frame_extraction_failure_is_fatal() {
    let h = Harness::new();
    h.media.fail(Step::Frames);

    let err = sample_and_detect(&h.context(), validated()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalStage);
    assert_eq!(h.detector.calls(), 0);
}
