//! First-run wizard: welcome → name → email → "link sent" → done.
//!
//! The flow is a plain state machine. The UI owns the 2 second pause between
//! [`OnboardingStep::Sent`] and [`OnboardingFlow::finish`] so the pause can
//! run without blocking input handling.

use std::time::Duration;

use crate::auth::AuthStore;
use crate::storage::{KeyValueStore, StorageError};
use crate::util::{validate_email, ValidationError};

/// Pause between "link sent" and the automatic sign-in.
pub const SENT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Welcome,
    NameEntry,
    EmailEntry,
    Sent,
    Completed,
}

impl OnboardingStep {
    /// 1-based position for the progress dots; `None` once past the form.
    pub fn number(self) -> Option<u8> {
        match self {
            OnboardingStep::Welcome => Some(1),
            OnboardingStep::NameEntry => Some(2),
            OnboardingStep::EmailEntry => Some(3),
            OnboardingStep::Sent | OnboardingStep::Completed => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OnboardingFlow {
    step: OnboardingStep,
    name: String,
    email: String,
}

impl Default for OnboardingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingFlow {
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::Welcome,
            name: String::new(),
            email: String::new(),
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_completed(&self) -> bool {
        self.step == OnboardingStep::Completed
    }

    /// True on the steps with a text field.
    pub fn has_input(&self) -> bool {
        matches!(self.step, OnboardingStep::NameEntry | OnboardingStep::EmailEntry)
    }

    /// The text field the current step edits, if any.
    pub fn input_mut(&mut self) -> Option<&mut String> {
        match self.step {
            OnboardingStep::NameEntry => Some(&mut self.name),
            OnboardingStep::EmailEntry => Some(&mut self.email),
            _ => None,
        }
    }

    pub fn continue_label(&self) -> &'static str {
        match self.step {
            OnboardingStep::EmailEntry => "Send Magic Link",
            _ => "Continue",
        }
    }

    /// Moves forward from the welcome or name step.
    ///
    /// Leaving the name step requires a non-blank name. Other steps are
    /// unaffected; the email step goes forward through [`Self::submit_email`].
    pub fn advance(&mut self) -> Result<(), ValidationError> {
        match self.step {
            OnboardingStep::Welcome => self.step = OnboardingStep::NameEntry,
            OnboardingStep::NameEntry => {
                if self.name.trim().is_empty() {
                    return Err(ValidationError::EmptyName);
                }
                self.step = OnboardingStep::EmailEntry;
            }
            _ => {}
        }
        Ok(())
    }

    /// Validates the email and requests the login link.
    ///
    /// On success the flow is in [`OnboardingStep::Sent`]; the caller should
    /// call [`Self::finish`] after [`SENT_DELAY`].
    pub async fn submit_email<S: KeyValueStore>(
        &mut self,
        auth: &AuthStore<S>,
    ) -> Result<(), ValidationError> {
        if self.step != OnboardingStep::EmailEntry {
            return Ok(());
        }
        validate_email(&self.email)?;
        auth.request_passwordless_login(&self.email).await?;
        self.step = OnboardingStep::Sent;
        tracing::debug!("Onboarding link sent");
        Ok(())
    }

    /// Signs the listener in with the captured name and email, then completes.
    ///
    /// Onboarding completes even when the sign-in write fails; the error is
    /// returned so the UI can tell the listener they are continuing as a guest.
    pub async fn finish<S: KeyValueStore>(
        &mut self,
        auth: &mut AuthStore<S>,
    ) -> Result<(), StorageError> {
        if self.step != OnboardingStep::Sent {
            return Ok(());
        }
        let result = auth.sign_in(&self.email, &self.name).await;
        self.complete(auth).await;
        result
    }

    /// Leaves as a guest. Ignored once the link has been sent.
    pub async fn skip<S: KeyValueStore>(&mut self, auth: &AuthStore<S>) -> bool {
        match self.step {
            OnboardingStep::Welcome | OnboardingStep::NameEntry | OnboardingStep::EmailEntry => {
                tracing::info!(step = ?self.step, "Onboarding skipped");
                self.complete(auth).await;
                true
            }
            OnboardingStep::Sent | OnboardingStep::Completed => false,
        }
    }

    async fn complete<S: KeyValueStore>(&mut self, auth: &AuthStore<S>) {
        if let Err(e) = auth.settings().mark_onboarding_completed().await {
            tracing::warn!(error = %e, "Failed to persist onboarding flag");
        }
        self.step = OnboardingStep::Completed;
    }
}
