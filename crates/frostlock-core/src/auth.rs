//! Credential verification.
//!
//! An [`Authenticator`] checks a frozen [`Password`] for a user. The
//! mechanism talks back through a [`PasswordConversation`], which answers a
//! closed set of [`Prompt`] kinds and forwards informational messages to the
//! lock screen before the verdict arrives.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

/// Errors that can occur while authenticating.
///
/// All of them are recoverable: the lock screen shows `Wrong` and the user
/// may try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The mechanism rejected the credentials.
    #[error("authentication rejected: {0}")]
    Rejected(String),

    /// The mechanism itself failed (misconfigured service, missing module).
    #[error("authentication mechanism failed: {0}")]
    Mechanism(String),

    /// The mechanism asked something we cannot answer.
    #[error("unsupported prompt kind: {0}")]
    UnsupportedPrompt(String),

    /// The background task running the check died.
    #[error("authentication task failed: {0}")]
    Task(String),
}

/// A password frozen at submission time.
///
/// The contents are wiped on drop and never printed.
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a password string.
    #[must_use]
    pub fn new(secret: String) -> Self {
        Self(Zeroizing::new(secret))
    }

    /// The secret itself. Only credential backends should call this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the password is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// The prompt kinds a credential mechanism may issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt<'a> {
    /// Hidden input, answered with the password.
    Secret(&'a str),
    /// Visible input, answered with an empty string.
    Echo(&'a str),
    /// Informational text shown on the lock screen.
    Info(&'a str),
}

/// Events an authentication attempt sends back to the lock screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Informational text from the mechanism.
    Info(String),
    /// The final outcome.
    Verdict(Result<(), AuthError>),
}

/// Answers prompts on behalf of the user for a single attempt.
pub struct PasswordConversation {
    password: Password,
    on_info: Box<dyn FnMut(String) + Send>,
}

impl PasswordConversation {
    /// Create a conversation answering with `password` and reporting
    /// informational messages through `on_info`.
    #[must_use]
    pub fn new(password: Password, on_info: impl FnMut(String) + Send + 'static) -> Self {
        Self {
            password,
            on_info: Box::new(on_info),
        }
    }

    /// Answer a prompt. `Info` prompts have no answer.
    pub fn respond(&mut self, prompt: Prompt<'_>) -> Option<&str> {
        match prompt {
            Prompt::Secret(_) => Some(self.password.expose()),
            Prompt::Echo(_) => Some(""),
            Prompt::Info(message) => {
                (self.on_info)(message.to_string());
                None
            }
        }
    }
}

impl fmt::Debug for PasswordConversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordConversation")
            .field("password", &self.password)
            .finish_non_exhaustive()
    }
}

/// A credential check backend.
///
/// Called on a blocking thread; implementations may take as long as the
/// underlying mechanism needs.
pub trait Authenticator: Send + Sync {
    /// Check the conversation's password for `user`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the credentials are not accepted for any
    /// reason.
    fn authenticate(&self, user: &str, conversation: PasswordConversation)
        -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("hunter2".to_string());
        let debug = format!("{password:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_password_is_empty() {
        let password = Password::new("pässwörd".to_string());
        assert!(!password.is_empty());
        assert!(Password::new(String::new()).is_empty());
    }

    #[test]
    fn test_conversation_answers_secret_with_password() {
        let mut conversation =
            PasswordConversation::new(Password::new("hunter2".to_string()), |_| {});
        assert_eq!(
            conversation.respond(Prompt::Secret("Password: ")),
            Some("hunter2")
        );
    }

    #[test]
    fn test_conversation_answers_echo_with_empty() {
        let mut conversation =
            PasswordConversation::new(Password::new("hunter2".to_string()), |_| {});
        assert_eq!(conversation.respond(Prompt::Echo("Login: ")), Some(""));
    }

    #[test]
    fn test_conversation_forwards_info() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut conversation =
            PasswordConversation::new(Password::new(String::new()), move |msg| {
                sink.lock().unwrap().push(msg);
            });

        assert_eq!(conversation.respond(Prompt::Info("Touch your key")), None);
        assert_eq!(conversation.respond(Prompt::Info("Retry")), None);
        assert_eq!(*seen.lock().unwrap(), vec!["Touch your key", "Retry"]);
    }

    #[test]
    fn test_conversation_debug_hides_password() {
        let conversation =
            PasswordConversation::new(Password::new("hunter2".to_string()), |_| {});
        assert!(!format!("{conversation:?}").contains("hunter2"));
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::UnsupportedPrompt("radio".to_string()).to_string(),
            "unsupported prompt kind: radio"
        );
        assert!(AuthError::Rejected("bad".to_string())
            .to_string()
            .contains("rejected"));
    }
}
