use super::types::Status;

/// Mutation to apply when a job is "run" again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    /// Already pending or running, nothing to do
    Wait,
    /// Manual job, start it
    Play,
    /// Finished in any state, run a new attempt
    Retry,
}

impl JobAction {
    pub fn for_status(status: &Status) -> Self {
        match status {
            Status::Pending | Status::Running => Self::Wait,
            Status::Manual => Self::Play,
            Status::Created
            | Status::WaitingForResource
            | Status::Preparing
            | Status::Scheduled
            | Status::Success
            | Status::Failed
            | Status::Canceling
            | Status::Canceled
            | Status::Skipped
            | Status::Unknown(_) => Self::Retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_jobs_wait() {
        assert_eq!(JobAction::for_status(&Status::Pending), JobAction::Wait);
        assert_eq!(JobAction::for_status(&Status::Running), JobAction::Wait);
    }

    #[test]
    fn manual_jobs_play() {
        assert_eq!(JobAction::for_status(&Status::Manual), JobAction::Play);
    }

    #[test]
    fn everything_else_retries() {
        for status in [
            Status::Failed,
            Status::Success,
            Status::Canceled,
            Status::Skipped,
            Status::Unknown("brand_new".to_string()),
        ] {
            assert_eq!(JobAction::for_status(&status), JobAction::Retry, "{status}");
        }
    }
}
