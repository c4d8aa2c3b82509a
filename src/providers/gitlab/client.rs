mod core;
mod jobs;
mod pipelines;

pub use self::core::GitLabClient;
pub use self::jobs::JobLog;
