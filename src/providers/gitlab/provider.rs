use std::fmt;

use log::{debug, info};

use crate::auth::Token;
use crate::error::{GlciError, Result};
use crate::git::CurrentBranch;
use crate::providers::gitlab::client::{GitLabClient, JobLog};

use super::dispatch::JobAction;
use super::ordering::sort_by_creation;
use super::selector::select_job;
use super::types::{Job, ListPipelinesOptions, Page, PipelineInfo, SortOrder, Status};

/// Page size used when collecting every job of a pipeline.
pub const JOBS_PER_PAGE: u32 = 500;

/// How to pick the pipeline an operation works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineFilter {
    Ref(String),
    Sha(String),
}

impl PipelineFilter {
    /// Filters by `ref_`, or by the current local branch when it is absent or
    /// empty.
    pub fn for_ref(ref_: Option<&str>, repo: &impl CurrentBranch) -> Result<Self> {
        match ref_ {
            Some(ref_) if !ref_.is_empty() => Ok(Self::Ref(ref_.to_string())),
            _ => Ok(Self::Ref(repo.current_branch()?)),
        }
    }

    fn options(&self) -> ListPipelinesOptions {
        let (ref_, sha) = match self {
            Self::Ref(ref_) => (Some(ref_.clone()), None),
            Self::Sha(sha) => (None, Some(sha.clone())),
        };
        ListPipelinesOptions {
            ref_,
            sha,
            sort: Some(SortOrder::Desc),
            page: Some(1),
            per_page: Some(1),
            ..Default::default()
        }
    }
}

impl fmt::Display for PipelineFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ref(ref_) => write!(f, "{ref_} branch"),
            Self::Sha(sha) => write!(f, "commit {sha}"),
        }
    }
}

/// GitLab CI/CD operations scoped to one project.
///
/// Every operation is a sequence of awaited requests issued one after the
/// other; nothing is cached between calls.
pub struct GitLabProvider {
    pub client: GitLabClient,
    pub project_path: String,
}

impl GitLabProvider {
    /// Creates a provider for the specified project.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitLab instance base URL (e.g., <https://gitlab.com>)
    /// * `project_path` - Project path or numeric id (e.g., "group/project")
    /// * `token` - Optional authentication token
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL cannot be constructed.
    pub fn new(base_url: &str, project_path: String, token: Option<Token>) -> Result<Self> {
        let client = GitLabClient::new(base_url, token)?;

        Ok(Self {
            client,
            project_path,
        })
    }

    /// Returns the newest pipeline matching `filter`.
    ///
    /// # Errors
    ///
    /// [`GlciError::PipelineNotFound`] when nothing matches; request failures
    /// are passed through unchanged.
    pub async fn latest_pipeline(&self, filter: &PipelineFilter) -> Result<PipelineInfo> {
        let Page { items, .. } = self
            .client
            .list_pipelines(&self.project_path, &filter.options())
            .await?;

        items
            .into_iter()
            .next()
            .ok_or_else(|| GlciError::PipelineNotFound(filter.to_string()))
    }

    /// Fetches every job of a pipeline, following pages until the last one.
    ///
    /// Jobs come back in API order (id descending). A failing page aborts
    /// the whole fetch.
    pub async fn pipeline_jobs(&self, pipeline_id: u64) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();
        let mut page = 1;

        loop {
            let Page { items, info } = self
                .client
                .list_pipeline_jobs_page(&self.project_path, pipeline_id, page, JOBS_PER_PAGE)
                .await?;

            debug!(
                "Pipeline {pipeline_id}: page {} of {:?} with {} jobs",
                info.current_page,
                info.total_pages,
                items.len()
            );
            jobs.extend(items);

            match info.next() {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(jobs)
    }

    /// Jobs of the newest pipeline for a commit, in creation order.
    pub async fn pipeline_jobs_with_sha(&self, sha: &str) -> Result<Vec<Job>> {
        let pipeline = self
            .latest_pipeline(&PipelineFilter::Sha(sha.to_string()))
            .await?;

        let mut jobs = self.pipeline_jobs(pipeline.id).await?;
        sort_by_creation(&mut jobs);

        Ok(jobs)
    }

    /// Newest pipeline on a branch together with all of its jobs.
    pub async fn jobs_for_ref(&self, filter: &PipelineFilter) -> Result<(PipelineInfo, Vec<Job>)> {
        let pipeline = self.latest_pipeline(filter).await?;
        let mut jobs = self.pipeline_jobs(pipeline.id).await?;
        sort_by_creation(&mut jobs);

        Ok((pipeline, jobs))
    }

    /// Resolves a branch or tag to the SHA of its head commit.
    pub async fn resolve_sha(&self, ref_: &str) -> Result<String> {
        let commit = self.client.get_commit(&self.project_path, ref_).await?;
        debug!("{ref_} resolves to {}", commit.id);
        Ok(commit.id)
    }

    /// Finds the job named `name` (or the best stand-in) in the commit's
    /// pipeline and opens its log.
    ///
    /// `Ok(None)` means the pipeline has no jobs, which is not an error.
    pub async fn job_trace_with_sha(&self, sha: &str, name: &str) -> Result<Option<(Job, JobLog)>> {
        let jobs = self.pipeline_jobs_with_sha(sha).await?;

        let Some(job) = select_job(&jobs, name).cloned() else {
            info!("No jobs found for commit {sha}");
            return Ok(None);
        };

        info!("Showing log of job {} ({}, {})", job.id, job.name, job.status);
        let log = self.client.job_trace(&self.project_path, job.id).await?;

        Ok(Some((job, log)))
    }

    /// Plays a manual job or retries a finished one; leaves active jobs alone.
    ///
    /// `status` is whatever the caller last read. The read and this mutation
    /// are separate requests, so the job may have moved on in between.
    pub async fn play_or_retry_job(&self, job_id: u64, status: &Status) -> Result<Option<Job>> {
        match JobAction::for_status(status) {
            JobAction::Wait => {
                info!("Job {job_id} is already {status}");
                Ok(None)
            }
            JobAction::Play => self
                .client
                .play_job(&self.project_path, job_id)
                .await
                .map(Some),
            JobAction::Retry => self
                .client
                .retry_job(&self.project_path, job_id)
                .await
                .map(Some),
        }
    }
}
