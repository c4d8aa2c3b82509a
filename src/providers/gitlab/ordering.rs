use super::types::Job;

/// Restores creation order of a pipeline's jobs.
///
/// The jobs endpoint returns jobs by id, newest first. The sort is stable, so
/// jobs sharing a creation timestamp keep their relative input order.
pub fn sort_by_creation(jobs: &mut [Job]) {
    jobs.sort_by_key(|job| job.created_at);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::gitlab::test_support::job;

    fn ids(jobs: &[Job]) -> Vec<u64> {
        jobs.iter().map(|j| j.id).collect()
    }

    #[test]
    fn orders_id_descending_input_by_creation() {
        let mut jobs = vec![
            job(30, "deploy", "pending", 3),
            job(20, "test", "success", 2),
            job(10, "build", "success", 1),
        ];

        sort_by_creation(&mut jobs);

        assert_eq!(ids(&jobs), vec![10, 20, 30]);
    }

    #[test]
    fn output_is_non_decreasing() {
        let mut jobs = vec![
            job(1, "a", "success", 5),
            job(2, "b", "success", 1),
            job(3, "c", "success", 4),
            job(4, "d", "success", 1),
            job(5, "e", "success", 3),
        ];

        sort_by_creation(&mut jobs);

        assert!(jobs.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let mut jobs = vec![
            job(9, "retry-b", "failed", 2),
            job(8, "retry-a", "failed", 2),
            job(7, "first", "success", 1),
            job(6, "retry-c", "failed", 2),
        ];

        sort_by_creation(&mut jobs);

        assert_eq!(ids(&jobs), vec![7, 9, 8, 6]);
    }

    #[test]
    fn sorting_twice_is_idempotent() {
        let mut jobs = vec![
            job(3, "c", "running", 2),
            job(2, "b", "success", 2),
            job(1, "a", "success", 1),
        ];

        sort_by_creation(&mut jobs);
        let once = ids(&jobs);
        sort_by_creation(&mut jobs);

        assert_eq!(ids(&jobs), once);
    }

    #[test]
    fn empty_list_is_fine() {
        let mut jobs: Vec<Job> = Vec::new();
        sort_by_creation(&mut jobs);
        assert!(jobs.is_empty());
    }
}
