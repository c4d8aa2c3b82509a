use serde::Serialize;

use super::core::{GitLabClient, NO_QUERY};
use crate::error::Result;
use crate::providers::gitlab::types::{
    Commit, CreatePipelineOptions, LintResult, ListPipelinesOptions, Page, Pipeline,
    PipelineInfo,
};

pub(crate) const DEFAULT_LIST_LIMIT: u32 = 30;

#[derive(Serialize)]
struct LintRequest<'a> {
    content: &'a str,
}

impl GitLabClient {
    /// Lists pipelines of a project, one page at a time.
    ///
    /// `per_page` falls back to [`DEFAULT_LIST_LIMIT`] when unset.
    pub async fn list_pipelines(
        &self,
        project: &str,
        opts: &ListPipelinesOptions,
    ) -> Result<Page<PipelineInfo>> {
        let mut opts = opts.clone();
        opts.per_page.get_or_insert(DEFAULT_LIST_LIMIT);
        let page = *opts.page.get_or_insert(1);

        let url = self.project_url(project, &["pipelines"])?;
        self.get_page(url, &opts, page).await
    }

    pub async fn get_pipeline(&self, project: &str, pipeline_id: u64) -> Result<Pipeline> {
        let url = self.project_url(project, &["pipelines", &pipeline_id.to_string()])?;
        self.get_json(url, NO_QUERY).await
    }

    pub async fn create_pipeline(
        &self,
        project: &str,
        opts: &CreatePipelineOptions,
    ) -> Result<Pipeline> {
        let url = self.project_url(project, &["pipeline"])?;
        self.post_json(url, Some(opts)).await
    }

    pub async fn retry_pipeline(&self, project: &str, pipeline_id: u64) -> Result<Pipeline> {
        let url = self.project_url(project, &["pipelines", &pipeline_id.to_string(), "retry"])?;
        self.post_json(url, None::<&()>).await
    }

    pub async fn delete_pipeline(&self, project: &str, pipeline_id: u64) -> Result<()> {
        let url = self.project_url(project, &["pipelines", &pipeline_id.to_string()])?;
        self.delete(url).await
    }

    /// Looks up a commit by SHA, branch or tag name.
    pub async fn get_commit(&self, project: &str, ref_: &str) -> Result<Commit> {
        let url = self.project_url(project, &["repository", "commits", ref_])?;
        self.get_json(url, NO_QUERY).await
    }

    /// Validates a CI configuration document in the context of a project.
    pub async fn lint(&self, project: &str, content: &str) -> Result<LintResult> {
        let url = self.project_url(project, &["ci", "lint"])?;
        self.post_json(url, Some(&LintRequest { content })).await
    }
}
