use crate::domain::ApplicationStatus;
use crate::error::PlacementError;

/// Which status changes an application may go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Forward-only state machine; terminal states are final.
    #[default]
    Strict,
    /// Any status may follow any other.
    Permissive,
}

impl TransitionPolicy {
    pub fn allows(self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        use ApplicationStatus::*;

        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => match from {
                Pending => matches!(to, Reviewed | Shortlisted | Accepted | Rejected | Withdrawn),
                Reviewed => matches!(to, Shortlisted | Accepted | Rejected | Withdrawn),
                Shortlisted => matches!(to, Accepted | Rejected | Withdrawn),
                Accepted | Rejected | Withdrawn => false,
            },
        }
    }

    pub fn check(self, from: ApplicationStatus, to: ApplicationStatus) -> Result<(), PlacementError> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(PlacementError::IllegalTransition { from, to })
        }
    }
}

/// `pending` is only ever set at creation and `withdrawn` belongs to the student.
pub fn company_may_set(status: ApplicationStatus) -> bool {
    !matches!(
        status,
        ApplicationStatus::Pending | ApplicationStatus::Withdrawn
    )
}
