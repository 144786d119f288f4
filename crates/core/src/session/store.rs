//! In-memory login session.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::{CredentialProvider, SessionError, UserProfile};

#[derive(Debug, Clone)]
struct SessionState {
    token: String,
    user: UserProfile,
}

/// Holds the bearer token and profile of the current administrator.
///
/// Cloning shares the same session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<RwLock<Option<SessionState>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with an already issued token.
    pub fn with_token(token: String, user: UserProfile) -> Result<Self, SessionError> {
        let token = normalize_token(token)?;
        Ok(Self {
            state: Arc::new(RwLock::new(Some(SessionState { token, user }))),
        })
    }

    /// Record a successful login.
    pub async fn login_success(&self, token: String, user: UserProfile) -> Result<(), SessionError> {
        let token = normalize_token(token)?;
        info!("Session opened for {}", user.username);
        *self.state.write().await = Some(SessionState { token, user });
        Ok(())
    }

    pub async fn logout(&self) {
        if let Some(previous) = self.state.write().await.take() {
            info!("Session closed for {}", previous.user.username);
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }

    pub async fn current_user(&self) -> Result<UserProfile, SessionError> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or(SessionError::NotAuthenticated)
    }
}

fn normalize_token(token: String) -> Result<String, SessionError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(SessionError::InvalidToken("token is empty".to_string()));
    }
    Ok(token.to_string())
}

#[async_trait]
impl CredentialProvider for Session {
    async fn bearer(&self) -> Option<String> {
        self.state.read().await.as_ref().map(|s| s.token.clone())
    }

    fn method_name(&self) -> &'static str {
        "session"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> UserProfile {
        UserProfile {
            username: "admin".to_string(),
            email: None,
            is_admin: true,
        }
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let session = Session::new();
        assert!(!session.is_authenticated().await);
        assert!(session.bearer().await.is_none());

        session.login_success("tok-1".to_string(), admin()).await.unwrap();
        assert!(session.is_authenticated().await);
        assert_eq!(session.bearer().await.as_deref(), Some("tok-1"));
        assert_eq!(session.current_user().await.unwrap().username, "admin");

        session.logout().await;
        assert!(!session.is_authenticated().await);
        assert!(matches!(
            session.current_user().await,
            Err(SessionError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_empty_token_rejected() {
        let session = Session::new();
        let result = session.login_success("   ".to_string(), admin()).await;
        assert!(matches!(result, Err(SessionError::InvalidToken(_))));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let session = Session::with_token("abc".to_string(), admin()).unwrap();
        let other = session.clone();
        other.logout().await;
        assert!(!session.is_authenticated().await);
    }

    #[test]
    fn test_method_name() {
        assert_eq!(Session::new().method_name(), "session");
    }
}
