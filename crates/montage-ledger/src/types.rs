//! Ledger record types.

use serde::{Deserialize, Serialize};

/// Finished video to record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Owner of the source upload
    pub user_email: String,
    /// Pipeline run identifier
    pub job_id: Option<String>,
    /// Key of the source video
    pub input_key: String,
    /// Key of the published montage
    pub output_key: String,
}

/// Acknowledgement of a created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordReceipt {
    /// Identifier assigned by the ledger
    pub video_id: String,
}

/// Wire body for `createVideoRecord`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateVideoRecord<'a> {
    pub operation: &'static str,
    #[serde(flatten)]
    pub record: &'a VideoRecord,
}

impl<'a> CreateVideoRecord<'a> {
    pub const OPERATION: &'static str = "createVideoRecord";

    pub fn new(record: &'a VideoRecord) -> Self {
        Self {
            operation: Self::OPERATION,
            record,
        }
    }
}

/// Ledger response; ids may come back as numbers or strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateVideoRecordResponse {
    pub video_id: serde_json::Value,
}

impl CreateVideoRecordResponse {
    pub fn into_receipt(self) -> Option<RecordReceipt> {
        let video_id = match self.video_id {
            serde_json::Value::String(s) if !s.is_empty() => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(RecordReceipt { video_id })
    }
}
