use tracing::{debug, warn};

use shared_models::scheduling::AppointmentStatus;

use crate::models::AppointmentError;

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed. `Scheduled` may move
    /// to `Canceled` or `Completed`, or stay `Scheduled` (a reschedule);
    /// the terminal states allow nothing.
    pub fn validate_transition(
        &self,
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition {} -> {}", current, next);

        if !self.valid_transitions(current).contains(&next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(AppointmentError::InvalidStatusTransition(current));
        }

        Ok(())
    }

    pub fn valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Scheduled,
                AppointmentStatus::Canceled,
                AppointmentStatus::Completed,
            ],
            // Terminal states
            AppointmentStatus::Canceled => vec![],
            AppointmentStatus::Completed => vec![],
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn scheduled_can_cancel_complete_or_reschedule() {
        let lifecycle = AppointmentLifecycleService::new();
        assert!(lifecycle
            .validate_transition(AppointmentStatus::Scheduled, AppointmentStatus::Canceled)
            .is_ok());
        assert!(lifecycle
            .validate_transition(AppointmentStatus::Scheduled, AppointmentStatus::Completed)
            .is_ok());
        assert!(lifecycle
            .validate_transition(AppointmentStatus::Scheduled, AppointmentStatus::Scheduled)
            .is_ok());
    }

    #[test]
    fn terminal_states_allow_nothing() {
        let lifecycle = AppointmentLifecycleService::new();
        for terminal in [AppointmentStatus::Canceled, AppointmentStatus::Completed] {
            for next in [
                AppointmentStatus::Scheduled,
                AppointmentStatus::Canceled,
                AppointmentStatus::Completed,
            ] {
                assert_matches!(
                    lifecycle.validate_transition(terminal, next),
                    Err(AppointmentError::InvalidStatusTransition(_))
                );
            }
        }
    }
}
