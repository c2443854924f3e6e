//! Identity resolved once per request by the upstream auth gateway.

use crate::ports::{AuthUser, IdentityProvider};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    user: Option<AuthUser>,
}

impl SessionIdentity {
    pub fn anonymous() -> Self { Self { user: None } }

    pub fn signed_in(id: impl Into<String>, email: Option<String>) -> Self {
        Self { user: Some(AuthUser { id: id.into(), email }) }
    }

    /// Blank ids count as anonymous.
    pub fn from_parts(id: Option<&str>, email: Option<&str>) -> Self {
        match id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Self::signed_in(id, email.map(str::trim).filter(|e| !e.is_empty()).map(String::from)),
            None => Self::anonymous(),
        }
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<AuthUser> { self.user.clone() }
}
