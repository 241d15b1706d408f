//! User confirmation.
//!
//! Whether to ask is a pure decision ([`ConfirmationPolicy`]); how to ask is a
//! collaborator ([`ConfirmationProvider`]). The orchestrator combines the two.

use dialoguer::{theme::ColorfulTheme, Confirm};

/// Asks the user a yes/no question
pub trait ConfirmationProvider: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// What to do about a potentially destructive action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationPolicy {
    /// Nothing to confirm, the action is not needed
    NotNeeded,
    /// Proceed without asking (`--yes`)
    AutoApprove,
    /// Ask the user
    Ask,
}

impl ConfirmationPolicy {
    pub fn decide(assume_yes: bool, action_needed: bool) -> Self {
        match (action_needed, assume_yes) {
            (false, _) => ConfirmationPolicy::NotNeeded,
            (true, true) => ConfirmationPolicy::AutoApprove,
            (true, false) => ConfirmationPolicy::Ask,
        }
    }
}

/// Interactive terminal prompt.
///
/// Any terminal error (no TTY, interrupted input) counts as "no".
#[derive(Debug, Default)]
pub struct DialoguerConfirm;

impl ConfirmationProvider for DialoguerConfirm {
    fn confirm(&self, message: &str) -> bool {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                log::warn!("Confirmation prompt failed: {}", e);
                false
            })
    }
}

/// Answers every question with yes
#[derive(Debug, Default)]
pub struct AssumeYes;

impl ConfirmationProvider for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}
