mod client;
mod dispatch;
mod links;
mod ordering;
mod provider;
mod selector;
#[cfg(test)]
mod test_support;
mod types;

pub use links::{job_url, pipeline_url};
pub use provider::{GitLabProvider, PipelineFilter};
pub use types::{
    CreatePipelineOptions, Job, LintResult, ListPipelinesOptions, Pipeline, PipelineInfo,
    PipelineVariable, SortOrder, Status, VariableType,
};
