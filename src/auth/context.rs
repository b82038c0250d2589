//! Per-request security context

use super::principal::AuthenticatedUser;

/// Holder of the current caller, empty until the authentication gate fills it
///
/// Created fresh for every request and carried in that request's extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    principal: Option<AuthenticatedUser>,
}

impl SecurityContext {
    /// Context with no authenticated caller
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context for an authenticated caller
    pub fn authenticated(user: AuthenticatedUser) -> Self {
        Self {
            principal: Some(user),
        }
    }

    pub fn principal(&self) -> Option<&AuthenticatedUser> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: Empty and populated contexts
    #[test]
    fn test_security_context() {
        assert!(!SecurityContext::empty().is_authenticated());
        assert!(SecurityContext::empty().principal().is_none());

        let ctx = SecurityContext::authenticated(AuthenticatedUser {
            id: 1,
            username: "yoga@studio.com".to_string(),
            first_name: "Admin".to_string(),
            last_name: "Admin".to_string(),
            admin: true,
        });
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.principal().unwrap().username, "yoga@studio.com");
    }
}
