//! PAM credential checks.

use std::ffi::{CStr, CString};

use frostlock_core::{AuthError, Authenticator, PasswordConversation, Prompt};
use pam_client::{Context, ConversationHandler, ErrorCode, Flag};
use tracing::{debug, warn};
use zeroize::Zeroize;

/// Checks passwords against a PAM service.
#[derive(Debug, Clone)]
pub struct PamAuthenticator {
    service: String,
}

impl PamAuthenticator {
    /// Use the given PAM service name (a file under `/etc/pam.d`).
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl Authenticator for PamAuthenticator {
    fn authenticate(
        &self,
        user: &str,
        conversation: PasswordConversation,
    ) -> Result<(), AuthError> {
        let handler = PamConversation::new(conversation);
        let mut context = Context::new(&self.service, Some(user), handler)
            .map_err(|e| AuthError::Mechanism(e.to_string()))?;

        debug!(service = %self.service, "starting PAM authentication");
        let result = context.authenticate(Flag::NONE);
        if let Some(kind) = context.conversation_mut().unsupported.take() {
            return Err(AuthError::UnsupportedPrompt(kind));
        }
        result.map_err(|e| AuthError::Rejected(e.to_string()))?;

        context
            .acct_mgmt(Flag::NONE)
            .map_err(|e| AuthError::Rejected(e.to_string()))
    }
}

/// Bridges PAM's callbacks onto a [`PasswordConversation`].
struct PamConversation {
    inner: PasswordConversation,
    unsupported: Option<String>,
}

impl PamConversation {
    fn new(inner: PasswordConversation) -> Self {
        Self {
            inner,
            unsupported: None,
        }
    }

    /// The returned copy is owned by pam-client from here on, which moves it
    /// into the PAM response array; PAM modules wipe and free responses.
    /// Rejected copies are wiped here.
    fn answer(&mut self, prompt: Prompt<'_>) -> Result<CString, ErrorCode> {
        let answer = self.inner.respond(prompt).unwrap_or_default();
        CString::new(answer).map_err(|e| {
            e.into_vec().zeroize();
            ErrorCode::CONV_ERR
        })
    }

    fn reject(&mut self, kind: &str) {
        warn!(kind, "PAM issued an unsupported prompt");
        self.unsupported.get_or_insert_with(|| kind.to_string());
    }
}

impl ConversationHandler for PamConversation {
    fn prompt_echo_on(&mut self, prompt: &CStr) -> Result<CString, ErrorCode> {
        self.answer(Prompt::Echo(&prompt.to_string_lossy()))
    }

    fn prompt_echo_off(&mut self, prompt: &CStr) -> Result<CString, ErrorCode> {
        self.answer(Prompt::Secret(&prompt.to_string_lossy()))
    }

    fn text_info(&mut self, msg: &CStr) {
        self.inner.respond(Prompt::Info(&msg.to_string_lossy()));
    }

    fn error_msg(&mut self, msg: &CStr) {
        debug!(message = %msg.to_string_lossy(), "PAM error message");
        self.reject("error message");
    }

    fn radio_prompt(&mut self, _prompt: &CStr) -> Result<bool, ErrorCode> {
        self.reject("radio");
        Err(ErrorCode::CONV_ERR)
    }

    fn binary_prompt(&mut self, _kind: u8, _data: &[u8]) -> Result<(u8, Vec<u8>), ErrorCode> {
        self.reject("binary");
        Err(ErrorCode::CONV_ERR)
    }
}
