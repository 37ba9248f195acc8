//! Login flow: browser round-trip through the backend, code exchange, and
//! handing the token to the session store.

use rankmute_proto::{ApiClient, SessionStore};
use serde::Deserialize;
use tracing::{info, warn};

/// Query parameters the provider redirect lands with.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Redirect carried no code; nothing was exchanged.
    NoCode { error: Option<String> },
    LoggedIn,
    Failed(String),
}

/// What the login page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoginStatus {
    #[default]
    Idle,
    /// Browser sent to `url`; waiting for the redirect.
    Waiting { url: String },
    Exchanging,
    Failed(String),
}

/// Finish a login from the callback parameters.  On success the token is
/// persisted and published through `store` before this returns.
pub async fn complete_login(
    api: &ApiClient,
    store: &SessionStore,
    origin: &str,
    params: CallbackParams,
) -> LoginOutcome {
    let code = match params.code.filter(|c| !c.is_empty()) {
        Some(c) => c,
        None => {
            info!(error = ?params.error, "login callback without a code");
            return LoginOutcome::NoCode {
                error: params.error,
            };
        }
    };

    let token = match api.exchange_code(&code, origin).await {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "code exchange failed");
            return LoginOutcome::Failed(e.to_string());
        }
    };

    match store.store(token) {
        Ok(()) => LoginOutcome::LoggedIn,
        Err(e) => {
            warn!(error = %e, "could not persist session");
            LoginOutcome::Failed(format!("could not save session: {}", e))
        }
    }
}
