//! Allowed payment status transitions.

use crate::entities::PaymentStatus;

/// What to do with a reported status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Write the new status.
    Apply,
    /// The payment is already in the reported status.
    Unchanged,
    /// The move is not allowed; the report is dropped.
    Rejected,
}

/// Decide whether `current` may move to `next`.
///
/// `success`, `failed` and `cancelled` are terminal. `expired` only accepts
/// a late `success`, so a confirmed payment is never lost.
pub fn plan(current: PaymentStatus, next: PaymentStatus) -> Transition {
    use PaymentStatus::*;

    if current == next {
        return Transition::Unchanged;
    }
    match (current, next) {
        (Pending, Processing | Success | Failed | Expired | Cancelled) => Transition::Apply,
        (Processing, Success | Failed | Expired | Cancelled) => Transition::Apply,
        (Expired, Success) => Transition::Apply,
        _ => Transition::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PaymentStatus::*;

    const ALL: [PaymentStatus; 6] = [Pending, Processing, Success, Failed, Expired, Cancelled];

    #[test]
    fn test_pending_moves_anywhere() {
        for next in [Processing, Success, Failed, Expired, Cancelled] {
            assert_eq!(plan(Pending, next), Transition::Apply, "pending -> {next:?}");
        }
    }

    #[test]
    fn test_processing_cannot_go_back_to_pending() {
        assert_eq!(plan(Processing, Pending), Transition::Rejected);
        assert_eq!(plan(Processing, Success), Transition::Apply);
        assert_eq!(plan(Processing, Expired), Transition::Apply);
    }

    #[test]
    fn test_terminal_statuses_reject_everything_else() {
        for current in [Success, Failed, Cancelled] {
            for next in ALL {
                let expected = if next == current {
                    Transition::Unchanged
                } else {
                    Transition::Rejected
                };
                assert_eq!(plan(current, next), expected, "{current:?} -> {next:?}");
            }
        }
    }

    #[test]
    fn test_expired_only_accepts_late_success() {
        assert_eq!(plan(Expired, Success), Transition::Apply);
        assert_eq!(plan(Expired, Failed), Transition::Rejected);
        assert_eq!(plan(Expired, Processing), Transition::Rejected);
        assert_eq!(plan(Expired, Cancelled), Transition::Rejected);
    }

    #[test]
    fn test_same_status_is_unchanged() {
        for status in ALL {
            assert_eq!(plan(status, status), Transition::Unchanged);
        }
    }
}
