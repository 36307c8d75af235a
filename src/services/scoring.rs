//! ICPC penalty scoring

use crate::constants::PENALTY_PER_WRONG_SUBMISSION_MINUTES;

/// Penalty minutes credited for a solved problem.
///
/// `elapsed_minutes` is the time from contest start to the accepting
/// submission; `attempts` counts this user's submissions on the problem up to
/// and including the accepting one, so it is always at least 1. Each attempt
/// before the accepting one costs 20 minutes on top of the elapsed time.
pub fn penalty_minutes(elapsed_minutes: i64, attempts: i32) -> i64 {
    let wrong_attempts = i64::from(attempts.saturating_sub(1));
    elapsed_minutes + wrong_attempts * PENALTY_PER_WRONG_SUBMISSION_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_costs_elapsed_time_only() {
        for t in [0, 1, 35, 120, 299] {
            assert_eq!(penalty_minutes(t, 1), t);
        }
    }

    #[test]
    fn test_each_extra_attempt_adds_twenty_minutes() {
        for a in 2..10 {
            assert_eq!(
                penalty_minutes(90, a) - penalty_minutes(90, a - 1),
                PENALTY_PER_WRONG_SUBMISSION_MINUTES
            );
        }
    }

    #[test]
    fn test_second_attempt_scenario() {
        // Accepted at minute 35 on the second attempt
        assert_eq!(penalty_minutes(35, 2), 55);
    }
}
