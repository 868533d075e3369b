// handlers/input.rs - request bodies and field checks shared across tiers

use serde::Deserialize;
use serde_json::Value;

use crate::database::models::LiveSessionUpdate;
use crate::error::ApiError;
use crate::services::dates::parse_start_time;

/// Trimmed text, or `None` when absent or blank
pub fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    present(value).ok_or_else(|| ApiError::bad_request(message))
}

/// Accepts JSON integers and integer-valued strings; everything else is dropped
pub fn integer_ids(values: &[Value]) -> Vec<i64> {
    values
        .iter()
        .filter_map(|value| match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
        .collect()
}

/// Body for creating or editing a course or group live session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub topic: Option<String>,
    #[serde(alias = "zoomJoinUrl")]
    pub join_url: Option<String>,
    pub start_time: Option<String>,
}

impl SessionRequest {
    pub fn into_fields(self) -> Result<LiveSessionUpdate, ApiError> {
        let (Some(topic), Some(join_url)) = (present(self.topic), present(self.join_url)) else {
            return Err(ApiError::bad_request("topic and joinUrl are required"));
        };
        let start_time = parse_start_time(self.start_time.as_deref()).map_err(ApiError::bad_request)?;
        Ok(LiveSessionUpdate {
            topic,
            join_url,
            start_time,
        })
    }
}

/// Body for attaching a recording; the video host pulls from `sourceVideoUrl`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingRequest {
    pub title: Option<String>,
    pub source_video_url: Option<String>,
}
