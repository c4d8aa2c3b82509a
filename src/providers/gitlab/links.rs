/// Web page of a pipeline, e.g. <https://gitlab.com/group/project/-/pipelines/123>
pub fn pipeline_url(base_url: &str, project_path: &str, pipeline_id: u64) -> String {
    format!("{}/{project_path}/-/pipelines/{pipeline_id}", trim_base(base_url))
}

/// Web page of a job, e.g. <https://gitlab.com/group/project/-/jobs/456>
pub fn job_url(base_url: &str, project_path: &str, job_id: u64) -> String {
    format!("{}/{project_path}/-/jobs/{job_id}", trim_base(base_url))
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}
