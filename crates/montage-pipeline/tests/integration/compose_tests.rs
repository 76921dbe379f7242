//! Clip composer tests.

use montage_pipeline::composer::FALLBACK_COMMENTARY;
use montage_pipeline::{compose, ErrorKind};
use montage_storage::ObjectStore;

use super::support::*;

fn clip_numbers(envelope: &montage_models::ComposedEnvelope) -> Vec<u32> {
    envelope.clips.iter().map(|c| c.clip_number).collect()
}

fn published(h: &Harness) -> Option<String> {
    h.store
        .object(BUCKET, MONTAGE_KEY)
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
}

#[tokio::test]
async fn test_no_intervals_makes_no_external_calls() {
    let h = Harness::new();

    let envelope = compose(&h.context(), intervals(&[])).await.unwrap();

    assert!(envelope.clips.is_empty());
    assert_eq!(envelope.total_clips, 0);
    assert!(envelope.montage_key.is_none());
    assert_eq!(envelope.source, source());

    assert_eq!(h.store.request_count(), 0);
    assert!(h.media.calls().is_empty());
    assert_eq!(h.text.calls(), 0);
    assert_eq!(h.speech.calls(), 0);
    assert_eq!(h.ledger.attempts(), 0);
}

#[tokio::test]
async fn test_two_clips_are_crossfaded_at_the_tail_of_the_first() {
    let h = Harness::new();
    h.media.set_duration("final_0.mp4", 10.0);
    h.media.set_duration("final_1.mp4", 8.0);

    let envelope = compose(&h.context(), intervals(&[(0.0, 10.0), (20.0, 28.0)]))
        .await
        .unwrap();

    let crossfades = h.media.calls_of(Step::Crossfade);
    assert_eq!(crossfades.len(), 1);
    let graph = crossfades[0]
        .invocation
        .arg_value("-filter_complex")
        .unwrap()
        .to_string();
    assert!(graph.contains("offset=9.500"), "graph: {}", graph);
    assert!(graph.contains("acrossfade"));
    assert!(h.media.calls_of(Step::ConcatCopy).is_empty());

    assert_eq!(envelope.montage_key.as_deref(), Some(MONTAGE_KEY));
    assert_eq!(clip_numbers(&envelope), vec![1, 2]);
    assert!(envelope.clips.iter().all(|c| c.commentary == COMMENTARY));
    assert!(envelope
        .clips
        .iter()
        .all(|c| c.montage_key.as_deref() == Some(MONTAGE_KEY)));
    assert_eq!(published(&h).as_deref(), Some("composite.mp4"));
    assert!(h.scratch_is_clean());
}

#[tokio::test]
async fn test_each_clip_is_trimmed_then_narrated() {
    let h = Harness::new();

    compose(&h.context(), intervals(&[(4.0, 10.0)])).await.unwrap();

    let trims = h.media.calls_of(Step::Trim);
    assert_eq!(trims.len(), 1);
    assert!(trims[0].invocation.has_arg_pair("-ss", "4.000"));
    assert!(trims[0].invocation.has_arg_pair("-to", "10.000"));
    assert!(trims[0].invocation.has_arg_pair("-c", "copy"));

    let overlays = h.media.calls_of(Step::Overlay);
    assert_eq!(overlays.len(), 1);
    let inputs = overlays[0].invocation.input_paths();
    assert!(inputs[0].ends_with("clip_0.mp4"));
    assert!(inputs[1].ends_with("commentary_0.mp3"));

    assert_eq!(h.speech.voices(), vec!["Stephen".to_string()]);
}

#[tokio::test]
async fn test_single_clip_is_published_unchanged() {
    let h = Harness::new();

    let envelope = compose(&h.context(), intervals(&[(0.0, 6.0)])).await.unwrap();

    assert!(h.media.calls_of(Step::Crossfade).is_empty());
    assert!(h.media.calls_of(Step::ConcatCopy).is_empty());
    assert_eq!(envelope.total_clips, 1);
    assert_eq!(published(&h).as_deref(), Some("final_0.mp4"));
}

#[tokio::test]
async fn test_crossfade_failure_falls_back_to_ordered_concat() {
    let h = Harness::new();
    h.media.fail(Step::Crossfade);

    let envelope = compose(
        &h.context(),
        intervals(&[(0.0, 6.0), (10.0, 16.0), (30.0, 36.0)]),
    )
    .await
    .unwrap();

    let concats = h.media.calls_of(Step::ConcatCopy);
    assert_eq!(concats.len(), 1);
    let manifest = concats[0].manifest.clone().unwrap();
    let listed: Vec<&str> = manifest.lines().collect();
    assert_eq!(listed.len(), 3);
    assert!(listed[0].ends_with("final_0.mp4'"));
    assert!(listed[1].ends_with("final_1.mp4'"));
    assert!(listed[2].ends_with("final_2.mp4'"));

    assert!(h.media.calls_of(Step::ConcatReencode).is_empty());
    assert_eq!(envelope.montage_key.as_deref(), Some(MONTAGE_KEY));
    assert_eq!(clip_numbers(&envelope), vec![1, 2, 3]);
    assert_eq!(published(&h).as_deref(), Some("composite.mp4"));
}

#[tokio::test]
async fn test_stream_copy_failure_falls_back_to_reencode() {
    let h = Harness::new();
    h.media.fail(Step::Crossfade);
    h.media.fail(Step::ConcatCopy);

    let envelope = compose(&h.context(), intervals(&[(0.0, 6.0), (10.0, 16.0)]))
        .await
        .unwrap();

    let reencodes = h.media.calls_of(Step::ConcatReencode);
    assert_eq!(reencodes.len(), 1);
    assert!(reencodes[0].invocation.has_arg_pair("-c:v", "libx264"));
    assert_eq!(envelope.montage_key.as_deref(), Some(MONTAGE_KEY));
}

#[tokio::test]
async fn test_short_clip_skips_crossfade() {
    let h = Harness::new();
    h.media.set_duration("final_1.mp4", 0.4);

    let envelope = compose(&h.context(), intervals(&[(0.0, 6.0), (10.0, 10.4)]))
        .await
        .unwrap();

    assert!(h.media.calls_of(Step::Crossfade).is_empty());
    assert_eq!(h.media.calls_of(Step::ConcatCopy).len(), 1);
    assert_eq!(envelope.total_clips, 2);
}

#[tokio::test]
async fn test_every_join_failing_publishes_nothing() {
    let h = Harness::new();
    h.media.fail(Step::Crossfade);
    h.media.fail(Step::ConcatCopy);
    h.media.fail(Step::ConcatReencode);

    let envelope = compose(&h.context(), intervals(&[(0.0, 6.0), (10.0, 16.0)]))
        .await
        .unwrap();

    assert!(envelope.montage_key.is_none());
    assert!(envelope.clips.is_empty());
    assert!(published(&h).is_none());
    assert_eq!(h.ledger.attempts(), 0);
    assert!(h.scratch_is_clean());
}

#[tokio::test]
async fn test_failed_narration_leaves_a_gap_in_clip_numbers() {
    let h = Harness::new();
    h.speech.fail_call(1);

    let envelope = compose(
        &h.context(),
        intervals(&[(0.0, 6.0), (10.0, 16.0), (30.0, 36.0)]),
    )
    .await
    .unwrap();

    assert_eq!(clip_numbers(&envelope), vec![1, 3]);
    assert_eq!(envelope.total_clips, 2);
    assert_eq!(envelope.clips[1].start, 30.0);
    assert_eq!(h.media.calls_of(Step::Trim).len(), 2);

    let crossfade = &h.media.calls_of(Step::Crossfade)[0];
    let inputs = crossfade.invocation.input_paths();
    assert_eq!(inputs.len(), 2);
    assert!(inputs[0].ends_with("final_0.mp4"));
    assert!(inputs[1].ends_with("final_2.mp4"));
}

#[tokio::test]
async fn test_failed_trim_or_overlay_drops_the_interval() {
    let h = Harness::new();
    h.media.fail_output(Step::Trim, "clip_0.mp4");
    h.media.fail_output(Step::Overlay, "final_2.mp4");

    let envelope = compose(
        &h.context(),
        intervals(&[(0.0, 6.0), (10.0, 16.0), (30.0, 36.0)]),
    )
    .await
    .unwrap();

    assert_eq!(clip_numbers(&envelope), vec![2]);
    assert_eq!(published(&h).as_deref(), Some("final_1.mp4"));
}

#[tokio::test]
async fn test_all_intervals_failing_publishes_nothing() {
    let h = Harness::new();
    h.media.fail(Step::Trim);

    let envelope = compose(&h.context(), intervals(&[(0.0, 6.0), (10.0, 16.0)]))
        .await
        .unwrap();

    assert!(envelope.montage_key.is_none());
    assert_eq!(envelope.total_clips, 0);
    assert!(published(&h).is_none());
}

#[tokio::test]
async fn test_text_failure_uses_stock_commentary() {
    let h = Harness::new();
    h.text.fail();

    let envelope = compose(&h.context(), intervals(&[(0.0, 6.0)])).await.unwrap();

    assert_eq!(envelope.clips[0].commentary, FALLBACK_COMMENTARY);
    assert!(envelope.montage_key.is_some());
}

#[tokio::test]
async fn test_background_track_is_mixed_under_the_montage() {
    let h = Harness::new();
    h.store.insert(BUCKET, "music/", Vec::new());
    h.add_track("anthem.mp3");

    compose(&h.context(), intervals(&[(0.0, 6.0), (10.0, 16.0)]))
        .await
        .unwrap();

    let mixes = h.media.calls_of(Step::Mix);
    assert_eq!(mixes.len(), 1);
    let inputs = mixes[0].invocation.input_paths();
    assert!(inputs[0].ends_with("composite.mp4"));
    assert!(inputs[1].ends_with("background.mp3"));
    assert!(mixes[0]
        .invocation
        .arg_value("-filter_complex")
        .unwrap()
        .contains("volume=0.2"));
    assert_eq!(published(&h).as_deref(), Some("montage.mp4"));
}

#[tokio::test]
async fn test_music_mix_failure_publishes_without_music() {
    let h = Harness::new();
    h.add_track("anthem.mp3");
    h.media.fail(Step::Mix);

    let envelope = compose(&h.context(), intervals(&[(0.0, 6.0), (10.0, 16.0)]))
        .await
        .unwrap();

    assert_eq!(envelope.montage_key.as_deref(), Some(MONTAGE_KEY));
    assert_eq!(published(&h).as_deref(), Some("composite.mp4"));
}

#[tokio::test]
async fn test_no_tracks_means_no_mix() {
    let h = Harness::new();
    h.store.insert(BUCKET, "music/", Vec::new());

    compose(&h.context(), intervals(&[(0.0, 6.0), (10.0, 16.0)]))
        .await
        .unwrap();

    assert!(h.media.calls_of(Step::Mix).is_empty());
}

#[tokio::test]
async fn test_upload_failure_is_fatal() {
    let h = Harness::new();
    h.store.reject_uploads();

    let err = compose(&h.context(), intervals(&[(0.0, 6.0)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalStage);
    assert_eq!(h.ledger.attempts(), 0);
    assert!(h.scratch_is_clean());
}

#[tokio::test]
async fn test_missing_source_video_is_fatal() {
    let h = Harness::new();
    h.store.delete(BUCKET, VIDEO_KEY).await.unwrap();

    let err = compose(&h.context(), intervals(&[(0.0, 6.0)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalStage);
    assert_eq!(h.speech.calls(), 0);
}

#[tokio::test]
async fn test_published_montage_is_recorded() {
    let h = Harness::new();

    compose(&h.context(), intervals(&[(0.0, 6.0)])).await.unwrap();

    let records = h.ledger.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_email, EMAIL);
    assert_eq!(records[0].input_key, VIDEO_KEY);
    assert_eq!(records[0].output_key, MONTAGE_KEY);
    assert_eq!(records[0].job_id.as_deref(), Some("run-42"));
}

#[tokio::test]
async fn test_ledger_failure_does_not_fail_the_stage() {
    let h = Harness::new();
    h.ledger.fail();

    let envelope = compose(&h.context(), intervals(&[(0.0, 6.0)])).await.unwrap();

    assert_eq!(h.ledger.attempts(), 1);
    assert_eq!(envelope.montage_key.as_deref(), Some(MONTAGE_KEY));
    assert!(published(&h).is_some());
}

#[tokio::test]
async fn test_output_bucket_override() {
    let h = Harness::new();
    let ctx = h.context_with(|c| c.output_bucket = Some("montages".to_string()));

    let envelope = compose(&ctx, intervals(&[(0.0, 6.0)])).await.unwrap();

    assert_eq!(envelope.montage_key.as_deref(), Some(MONTAGE_KEY));
    assert!(h.store.object("montages", MONTAGE_KEY).is_some());
    assert!(published(&h).is_none());
}

#[tokio::test]
async fn test_run_without_job_id_is_recorded_under_a_fresh_one() {
    let h = Harness::new();
    let input = montage_models::IntervalEnvelope::new(
        source(),
        None,
        vec![montage_models::Interval::new(0.0, 6.0)],
    );

    let envelope = compose(&h.context(), input).await.unwrap();

    assert!(envelope.job_id.is_none());
    let records = h.ledger.records();
    let job_id = records[0].job_id.as_deref().unwrap();
    assert!(!job_id.is_empty());
}
