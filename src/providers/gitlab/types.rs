use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a GitLab pipeline or job.
///
/// GitLab grows this list from time to time; values this build doesn't know
/// land in [`Status::Unknown`] with the original name kept, so they survive a
/// round trip through JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Manual,
    Scheduled,
    Success,
    Failed,
    Canceling,
    Canceled,
    Skipped,
    Unknown(String),
}

const KNOWN: [Status; 12] = [
    Status::Created,
    Status::WaitingForResource,
    Status::Preparing,
    Status::Pending,
    Status::Running,
    Status::Manual,
    Status::Scheduled,
    Status::Success,
    Status::Failed,
    Status::Canceling,
    Status::Canceled,
    Status::Skipped,
];

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::WaitingForResource => "waiting_for_resource",
            Self::Preparing => "preparing",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Canceling => "canceling",
            Self::Canceled => "canceled",
            Self::Skipped => "skipped",
            Self::Unknown(name) => name.as_str(),
        }
    }

    fn known(name: &str) -> Option<Self> {
        KNOWN.into_iter().find(|status| status.as_str() == name)
    }
}

impl From<String> for Status {
    fn from(name: String) -> Self {
        Self::known(&name).unwrap_or(Self::Unknown(name))
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse for user input: unlike deserialization, unknown names are
/// rejected.
impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::known(&s.to_lowercase()).ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// Pipeline entry as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub id: u64,
    #[serde(default)]
    pub iid: u64,
    pub project_id: u64,
    #[serde(rename = "ref")]
    pub ref_: String,
    pub sha: String,
    pub status: Status,
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A single pipeline with its execution details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    #[serde(default)]
    pub iid: u64,
    pub project_id: u64,
    #[serde(rename = "ref")]
    pub ref_: String,
    pub sha: String,
    pub status: Status,
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Total run time in seconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub coverage: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// The pipeline a job belongs to, as embedded in job payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRef {
    pub id: u64,
    #[serde(rename = "ref", default)]
    pub ref_: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
}

/// A job within a GitLab CI/CD pipeline.
///
/// Names are not unique: every retry creates a new job carrying the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub stage: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Execution time in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(rename = "ref", default)]
    pub ref_: Option<String>,
    #[serde(default)]
    pub allow_failure: bool,
    #[serde(default)]
    pub web_url: Option<String>,
    pub pipeline: PipelineRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub short_id: String,
    pub title: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_pipeline: Option<PipelineInfo>,
}

/// Outcome of validating a CI configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub merged_yaml: Option<String>,
}

/// Filters for the pipeline list endpoint. Unset fields are left out of the
/// query string.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListPipelinesOptions {
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Payload for triggering a new pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePipelineOptions {
    #[serde(rename = "ref")]
    pub ref_: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<PipelineVariable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineVariable {
    pub key: String,
    pub value: String,
    pub variable_type: VariableType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    EnvVar,
    File,
}

impl PipelineVariable {
    /// Parses `KEY=VALUE`.
    pub fn parse(raw: &str, variable_type: VariableType) -> Option<Self> {
        let (key, value) = raw.split_once('=')?;
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key: key.to_string(),
            value: value.to_string(),
            variable_type,
        })
    }
}

/// One page of a paginated list, with the cursor values from the response
/// headers.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: Option<u32>,
    pub next_page: Option<u32>,
}

impl PageInfo {
    /// Page to request after this one, if any.
    ///
    /// `X-Total-Pages` is authoritative when present. Large result sets may
    /// come without it; then `X-Next-Page` decides.
    pub fn next(&self) -> Option<u32> {
        match self.total_pages {
            Some(total) if self.current_page < total => Some(self.current_page + 1),
            Some(_) => None,
            None => self.next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod status {
        use super::*;

        #[test]
        fn deserializes_known_values() {
            let status: Status = serde_json::from_str("\"waiting_for_resource\"").unwrap();
            assert_eq!(status, Status::WaitingForResource);
        }

        #[test]
        fn unknown_value_keeps_its_name() {
            let status: Status = serde_json::from_str("\"brand_new_state\"").unwrap();
            assert_eq!(status, Status::Unknown("brand_new_state".to_string()));
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                "\"brand_new_state\""
            );
        }

        #[test]
        fn known_value_serializes_to_wire_name() {
            let json = serde_json::to_string(&Status::WaitingForResource).unwrap();
            assert_eq!(json, "\"waiting_for_resource\"");
        }

        #[test]
        fn parses_user_input_strictly() {
            assert_eq!("Failed".parse::<Status>(), Ok(Status::Failed));
            assert!("unknown".parse::<Status>().is_err());
            assert!("nope".parse::<Status>().is_err());
        }

        #[test]
        fn displays_wire_name() {
            assert_eq!(Status::Canceled.to_string(), "canceled");
        }
    }

    #[cfg(test)]
    mod job {
        use super::*;

        #[test]
        fn deserializes_api_payload() {
            let json = r#"{
                "id": 8,
                "name": "rspec:other",
                "stage": "test",
                "status": "failed",
                "created_at": "2015-12-24T15:51:21.802Z",
                "started_at": "2015-12-24T17:54:24.729Z",
                "finished_at": null,
                "duration": 0.465,
                "ref": "main",
                "allow_failure": false,
                "web_url": "https://example.com/foo/bar/-/jobs/8",
                "pipeline": {"id": 6, "project_id": 1, "ref": "main", "sha": "0ff3ae19", "status": "pending"},
                "user": {"id": 1}
            }"#;

            let job: Job = serde_json::from_str(json).unwrap();
            assert_eq!(job.id, 8);
            assert_eq!(job.status, Status::Failed);
            assert_eq!(job.pipeline.id, 6);
            assert_eq!(job.pipeline.status, Some(Status::Pending));
            assert!(job.finished_at.is_none());
        }
    }

    #[cfg(test)]
    mod list_pipelines_options {
        use super::*;

        #[test]
        fn omits_unset_fields() {
            let opts = ListPipelinesOptions {
                ref_: Some("main".into()),
                sort: Some(SortOrder::Desc),
                ..Default::default()
            };
            let value = serde_json::to_value(&opts).unwrap();
            assert_eq!(value, serde_json::json!({"ref": "main", "sort": "desc"}));
        }
    }

    #[cfg(test)]
    mod pipeline_variable {
        use super::*;

        #[test]
        fn parses_key_value() {
            let var = PipelineVariable::parse("DEPLOY=true", VariableType::EnvVar).unwrap();
            assert_eq!(var.key, "DEPLOY");
            assert_eq!(var.value, "true");
            assert_eq!(var.variable_type, VariableType::EnvVar);
        }

        #[test]
        fn keeps_equals_in_value() {
            let var = PipelineVariable::parse("ARGS=a=b", VariableType::File).unwrap();
            assert_eq!(var.variable_type, VariableType::File);
            assert_eq!(var.value, "a=b");
        }

        #[test]
        fn rejects_missing_separator_or_key() {
            assert!(PipelineVariable::parse("NOVALUE", VariableType::EnvVar).is_none());
            assert!(PipelineVariable::parse("=x", VariableType::EnvVar).is_none());
        }
    }

    #[cfg(test)]
    mod page_info {
        use super::*;

        #[test]
        fn last_when_current_equals_total() {
            let info = PageInfo {
                current_page: 3,
                total_pages: Some(3),
                next_page: None,
            };
            assert_eq!(info.next(), None);
        }

        #[test]
        fn not_last_when_more_pages() {
            let info = PageInfo {
                current_page: 1,
                total_pages: Some(3),
                next_page: Some(2),
            };
            assert!(info.next().is_some());
        }

        #[test]
        fn total_alone_drives_paging() {
            let info = PageInfo {
                current_page: 1,
                total_pages: Some(2),
                next_page: None,
            };
            assert_eq!(info.next(), Some(2));
            assert!(info.next().is_some());
        }

        #[test]
        fn missing_total_relies_on_next_page() {
            let more = PageInfo {
                current_page: 40,
                total_pages: None,
                next_page: Some(41),
            };
            let done = PageInfo {
                current_page: 41,
                total_pages: None,
                next_page: None,
            };
            assert_eq!(more.next(), Some(41));
            assert_eq!(done.next(), None);
        }
    }
}
