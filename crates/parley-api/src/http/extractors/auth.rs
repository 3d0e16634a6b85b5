//! Requesting-user extractor.
//!
//! Authentication is disabled: every request resolves to the anonymous user,
//! and sessions are stored without an owner. Handlers still take a
//! [`CurrentUser`] so that an owner check can be added here without touching
//! their signatures.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

/// The user on whose behalf a request is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentUser {
    user_id: Option<Uuid>,
}

impl CurrentUser {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Owner reference recorded on sessions this user creates.
    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser::anonymous())
    }
}
