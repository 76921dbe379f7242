//! Trigger payload validation.

use serde_json::{Map, Value};

use montage_models::{JobId, SourceRef, ValidatedEnvelope};

use crate::error::ValidationError;

/// Legacy trigger name accepted for `detectorRef`.
const DETECTOR_REF_ALIAS: &str = "modelArn";

/// Validate a raw trigger payload and derive the owning identity.
///
/// `bucket`, `videoKey` and `detectorRef` are checked in that order; a field
/// that is absent, null, not a string or empty counts as missing.
pub fn validate(payload: &Value) -> Result<ValidatedEnvelope, ValidationError> {
    let fields = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let bucket = required(fields, "bucket", None)?;
    let video_key = required(fields, "videoKey", None)?;
    let detector_ref = required(fields, "detectorRef", Some(DETECTOR_REF_ALIAS))?;
    let email = owner_identity(video_key)?;

    let job_id = fields
        .get("jobId")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(JobId::from_string);

    Ok(ValidatedEnvelope {
        source: SourceRef::new(bucket, video_key, email),
        detector_ref: detector_ref.to_string(),
        job_id,
    })
}

fn required<'a>(
    fields: &'a Map<String, Value>,
    name: &'static str,
    alias: Option<&str>,
) -> Result<&'a str, ValidationError> {
    let present = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };

    present(name)
        .or_else(|| alias.and_then(present))
        .ok_or(ValidationError::MissingField(name))
}

/// Owning identity: the first `/`-separated segment of the key, which must
/// look like an email address.
pub fn owner_identity(video_key: &str) -> Result<&str, ValidationError> {
    let (owner, _) = video_key
        .split_once('/')
        .ok_or_else(|| ValidationError::MalformedKey {
            key: video_key.to_string(),
            reason: "no path separator",
        })?;

    if !owner.contains('@') {
        return Err(ValidationError::MalformedKey {
            key: video_key.to_string(),
            reason: "first segment is not an email address",
        });
    }

    Ok(owner)
}
