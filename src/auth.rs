//! Authentication seam
//!
//! The generation and display code only needs to know whether a user is
//! present and what their id is. Token issuance (sign-in, sign-up, OAuth)
//! lives outside this service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::AuthConfig;

/// An authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
}

/// Resolves a bearer token to the current user
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn current_user(&self, token: &str) -> Option<User>;
}

/// Authenticator backed by a fixed token table from the config file
#[derive(Debug, Clone, Default)]
pub struct TokenAuthenticator {
    users: HashMap<String, User>,
}

impl TokenAuthenticator {
    pub fn from_config(config: &AuthConfig) -> Self {
        let users = config
            .tokens
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    User {
                        id: entry.user_id.clone(),
                        email: entry.email.clone(),
                    },
                )
            })
            .collect();

        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn current_user(&self, token: &str) -> Option<User> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        self.users.get(token).cloned()
    }
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenEntry;

    fn authenticator() -> TokenAuthenticator {
        TokenAuthenticator::from_config(&AuthConfig {
            tokens: vec![TokenEntry {
                token: "secret-token".to_string(),
                user_id: "user-1".to_string(),
                email: Some("me@example.com".to_string()),
            }],
        })
    }

    #[tokio::test]
    async fn test_known_token_resolves_user() {
        let user = authenticator().current_user("secret-token").await.unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.email.as_deref(), Some("me@example.com"));
    }

    #[tokio::test]
    async fn test_unknown_or_empty_token() {
        let auth = authenticator();
        assert!(auth.current_user("wrong").await.is_none());
        assert!(auth.current_user("").await.is_none());
        assert!(TokenAuthenticator::default().current_user("secret-token").await.is_none());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
