use std::io::Write;

use reqwest::Response;
use serde::Serialize;

use super::core::{GitLabClient, NO_QUERY};
use crate::error::Result;
use crate::providers::gitlab::types::{Job, Page, Status};

#[derive(Serialize)]
struct PageQuery {
    page: u32,
    per_page: u32,
}

/// Raw job log, streamed from the response body.
///
/// Read to exhaustion or error; nothing is buffered beyond the current chunk.
pub struct JobLog {
    response: Response,
}

impl JobLog {
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.response.chunk().await?.map(|chunk| chunk.to_vec()))
    }

    /// Writes the remaining log to `out`, returning the number of bytes copied.
    pub async fn copy_to<W: Write>(mut self, out: &mut W) -> Result<u64> {
        let mut copied = 0;
        while let Some(chunk) = self.next_chunk().await? {
            out.write_all(&chunk)?;
            copied += chunk.len() as u64;
        }
        out.flush()?;
        Ok(copied)
    }
}

impl GitLabClient {
    /// Fetches a single page of a pipeline's jobs.
    ///
    /// GitLab returns these ordered by id, newest first.
    pub async fn list_pipeline_jobs_page(
        &self,
        project: &str,
        pipeline_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Job>> {
        let url = self.project_url(project, &["pipelines", &pipeline_id.to_string(), "jobs"])?;
        self.get_page(url, &PageQuery { page, per_page }, page).await
    }

    /// Lists the most recent jobs of a project, optionally restricted to the
    /// given statuses.
    pub async fn list_project_jobs(
        &self,
        project: &str,
        scopes: &[Status],
        per_page: u32,
    ) -> Result<Vec<Job>> {
        let url = self.project_url(project, &["jobs"])?;
        let mut query: Vec<(&str, String)> = scopes
            .iter()
            .map(|scope| ("scope[]", scope.as_str().to_string()))
            .collect();
        query.push(("per_page", per_page.to_string()));

        self.get_json(url, &query).await
    }

    pub async fn get_job(&self, project: &str, job_id: u64) -> Result<Job> {
        let url = self.project_url(project, &["jobs", &job_id.to_string()])?;
        self.get_json(url, NO_QUERY).await
    }

    /// Starts a manual job.
    pub async fn play_job(&self, project: &str, job_id: u64) -> Result<Job> {
        self.job_action(project, job_id, "play").await
    }

    pub async fn retry_job(&self, project: &str, job_id: u64) -> Result<Job> {
        self.job_action(project, job_id, "retry").await
    }

    pub async fn cancel_job(&self, project: &str, job_id: u64) -> Result<Job> {
        self.job_action(project, job_id, "cancel").await
    }

    /// Removes the job's log and artifacts.
    pub async fn erase_job(&self, project: &str, job_id: u64) -> Result<Job> {
        self.job_action(project, job_id, "erase").await
    }

    pub async fn job_trace(&self, project: &str, job_id: u64) -> Result<JobLog> {
        let url = self.project_url(project, &["jobs", &job_id.to_string(), "trace"])?;
        let response = self.get_raw(url).await?;
        Ok(JobLog { response })
    }

    async fn job_action(&self, project: &str, job_id: u64, action: &str) -> Result<Job> {
        let url = self.project_url(project, &["jobs", &job_id.to_string(), action])?;
        self.post_json(url, None::<&()>).await
    }
}
