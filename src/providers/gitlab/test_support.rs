use chrono::{DateTime, TimeZone, Utc};

use super::types::{Job, PipelineRef, Status};

pub const PIPELINE_ID: u64 = 7;

pub fn created(offset_secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap() + chrono::Duration::seconds(offset_secs)
}

/// Job in pipeline [`PIPELINE_ID`]; `status` uses the API spelling.
pub fn job(id: u64, name: &str, status: &str, created_offset: i64) -> Job {
    let status: Status = serde_json::from_value(serde_json::Value::String(status.into())).unwrap();
    Job {
        id,
        name: name.to_string(),
        stage: "test".to_string(),
        status,
        created_at: created(created_offset),
        started_at: None,
        finished_at: None,
        duration: None,
        ref_: Some("main".to_string()),
        allow_failure: false,
        web_url: None,
        pipeline: PipelineRef {
            id: PIPELINE_ID,
            ref_: Some("main".to_string()),
            sha: None,
            status: None,
        },
    }
}

/// Serializes jobs the way the API returns them.
pub fn jobs_body(jobs: &[Job]) -> String {
    serde_json::to_string(jobs).unwrap()
}
