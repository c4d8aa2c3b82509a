use super::types::{Job, Status};

/// Picks the job whose log is most worth showing for `name`.
///
/// `jobs` must already be in creation order. Priority:
/// 1. the last job named `name` (a later retry overrides an earlier one)
/// 2. the last running job
/// 3. the first pending job
/// 4. the last job overall
///
/// Returns `None` only for an empty list.
pub fn select_job<'a>(jobs: &'a [Job], name: &str) -> Option<&'a Job> {
    let mut by_name = None;
    let mut last_running = None;
    let mut first_pending = None;

    for job in jobs {
        if job.status == Status::Running {
            last_running = Some(job);
        }
        if job.status == Status::Pending && first_pending.is_none() {
            first_pending = Some(job);
        }
        if job.name == name {
            // keep going, a newer retry may follow
            by_name = Some(job);
        }
    }

    by_name
        .or(last_running)
        .or(first_pending)
        .or_else(|| jobs.last())
}
