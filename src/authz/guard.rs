use super::{Authorizer, EnforcementMode};
use crate::errors::{AbilityError, AbilityResult};
use crate::models::{Args, SubjectRef};

/// Applies an [`EnforcementMode`] on top of an [`Authorizer`].
///
/// Hosts call [`Guard::check`] at their request boundary and turn the
/// `Forbidden` error into whatever rejection their transport uses.
#[derive(Debug, Clone)]
pub struct Guard<A> {
    authorizer: A,
    mode: EnforcementMode,
}

impl<A: Authorizer> Guard<A> {
    pub fn new(authorizer: A, mode: EnforcementMode) -> Self {
        Self { authorizer, mode }
    }

    pub fn mode(&self) -> EnforcementMode {
        self.mode
    }

    pub fn authorizer(&self) -> &A {
        &self.authorizer
    }

    pub fn check<'s>(&self, action: &str, subject: impl Into<SubjectRef<'s>>) -> AbilityResult<()> {
        self.check_with(action, subject, &Args::new())
    }

    pub fn check_with<'s>(
        &self,
        action: &str,
        subject: impl Into<SubjectRef<'s>>,
        args: &Args,
    ) -> AbilityResult<()> {
        let subject = subject.into();

        if self.mode == EnforcementMode::Off {
            return Ok(());
        }

        if self.authorizer.permits(action, subject, args) {
            return Ok(());
        }

        let reason = self.authorizer.denial_reason(action, subject);
        match self.mode {
            EnforcementMode::Advisory => {
                tracing::warn!(
                    action = %action,
                    subject = %subject,
                    reason = ?reason,
                    "permission denied (advisory, allowing)"
                );
                Ok(())
            }
            _ => {
                tracing::debug!(
                    action = %action,
                    subject = %subject,
                    reason = ?reason,
                    "permission denied"
                );
                Err(AbilityError::forbidden(action, subject.identity(), reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DenyAll;

    impl Authorizer for DenyAll {
        fn permits(&self, _action: &str, _subject: SubjectRef<'_>, _args: &Args) -> bool {
            false
        }

        fn denial_reason(&self, _action: &str, _subject: SubjectRef<'_>) -> Option<String> {
            Some("nobody gets in".to_string())
        }
    }

    #[test]
    fn off_allows_everything() {
        let guard = Guard::new(DenyAll, EnforcementMode::Off);
        assert!(guard.check("delete", "Project").is_ok());
    }

    #[test]
    fn advisory_logs_but_allows() {
        let guard = Guard::new(DenyAll, EnforcementMode::Advisory);
        assert!(guard.check("delete", "Project").is_ok());
    }

    #[test]
    fn strict_rejects_with_reason() {
        let guard = Guard::new(DenyAll, EnforcementMode::Strict);
        let err = guard.check("delete", "Project").unwrap_err();
        assert_eq!(
            err,
            AbilityError::forbidden("delete", "Project", Some("nobody gets in".to_string()))
        );
    }
}
