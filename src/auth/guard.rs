/// Role model and authorization guard
use crate::auth::token::{Claims, TokenService};
use crate::error::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};

/// Role tiers recognized by the portal.
///
/// Roles are stored and transported as integer tags; 99 is the reserved
/// elevated tier. Unknown integers are valid authenticated identities but
/// never match a named role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const fn as_id(self) -> i64 {
        match self {
            Role::User => 1,
            Role::Admin => 99,
        }
    }

    pub fn from_id(id: i64) -> Option<Role> {
        match id {
            1 => Some(Role::User),
            99 => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Access requirement declared by a protected operation and enforced by
/// the single `authorize` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequirement {
    /// Any caller bearing a valid token
    Authenticated,
    /// Valid token carrying the admin role
    Elevated,
    /// Valid token whose user id matches the owner, or the admin role
    SelfOrElevated { owner_id: i64 },
}

/// True iff the token verifies (signature and expiry)
pub fn is_authenticated(tokens: &TokenService, token: &str) -> bool {
    tokens.verify(token)
}

/// True iff the token's role claim is a member of `allowed`.
/// Any decode failure yields false.
pub fn has_role(tokens: &TokenService, token: &str, allowed: &[Role]) -> bool {
    match tokens.decode(token) {
        Some(claims) => allowed.iter().any(|role| role.as_id() == claims.role_id),
        None => false,
    }
}

/// Check already-decoded claims against a requirement.
///
/// Ownership compares the identity claim from the verified token, never
/// an identity supplied by the request body.
pub fn permits(claims: &Claims, requirement: AccessRequirement) -> bool {
    match requirement {
        AccessRequirement::Authenticated => true,
        AccessRequirement::Elevated => claims.role_id == Role::Admin.as_id(),
        AccessRequirement::SelfOrElevated { owner_id } => {
            claims.user_id == owner_id || claims.role_id == Role::Admin.as_id()
        }
    }
}

/// Decode the token and enforce the requirement, returning the caller's
/// claims on success.
pub fn authorize(
    tokens: &TokenService,
    token: &str,
    requirement: AccessRequirement,
) -> PortalResult<Claims> {
    let claims = tokens
        .decode(token)
        .ok_or_else(|| PortalError::Authentication("Invalid or missing token".to_string()))?;

    if permits(&claims, requirement) {
        Ok(claims)
    } else {
        Err(PortalError::Authorization(
            "Insufficient privileges".to_string(),
        ))
    }
}

/// Resolve the user id an operation should act as.
///
/// An elevated caller may name a different target user id; everyone else
/// acts as the token identity regardless of what the request asked for.
pub fn resolve_actor_id(claims: &Claims, requested: Option<i64>) -> i64 {
    match requested {
        Some(id) if id != claims.user_id && claims.role_id == Role::Admin.as_id() => id,
        _ => claims.user_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::DEFAULT_TTL_MINUTES;

    fn service() -> TokenService {
        TokenService::new("test-secret-key-that-is-long-enough!", DEFAULT_TTL_MINUTES)
    }

    fn claims(user_id: i64, role_id: i64) -> Claims {
        Claims {
            user_id,
            username: "alice".to_string(),
            role_id,
            exp: 0, // not inspected by permits
        }
    }

    #[test]
    fn test_role_ids() {
        assert_eq!(Role::User.as_id(), 1);
        assert_eq!(Role::Admin.as_id(), 99);
        assert_eq!(Role::from_id(1), Some(Role::User));
        assert_eq!(Role::from_id(99), Some(Role::Admin));
        assert_eq!(Role::from_id(7), None);
    }

    #[test]
    fn test_ordinary_role_denied_elevated() {
        let c = claims(1, Role::User.as_id());
        assert!(!permits(&c, AccessRequirement::Elevated));
        assert!(permits(&c, AccessRequirement::Authenticated));
    }

    #[test]
    fn test_admin_role_permitted_elevated() {
        let c = claims(1, Role::Admin.as_id());
        assert!(permits(&c, AccessRequirement::Elevated));
    }

    #[test]
    fn test_unknown_role_is_authenticated_but_never_elevated() {
        let c = claims(1, 42);
        assert!(permits(&c, AccessRequirement::Authenticated));
        assert!(!permits(&c, AccessRequirement::Elevated));
        assert!(!permits(&c, AccessRequirement::SelfOrElevated { owner_id: 2 }));
    }

    #[test]
    fn test_self_or_elevated() {
        let owner = claims(7, Role::User.as_id());
        assert!(permits(&owner, AccessRequirement::SelfOrElevated { owner_id: 7 }));
        assert!(!permits(&owner, AccessRequirement::SelfOrElevated { owner_id: 8 }));

        let admin = claims(1, Role::Admin.as_id());
        assert!(permits(&admin, AccessRequirement::SelfOrElevated { owner_id: 8 }));
    }

    #[test]
    fn test_has_role_membership() {
        let tokens = service();
        let user_token = tokens.issue(1, "alice", Role::User.as_id()).unwrap();
        let admin_token = tokens.issue(2, "root", Role::Admin.as_id()).unwrap();

        assert!(has_role(&tokens, &user_token, &[Role::User, Role::Admin]));
        assert!(!has_role(&tokens, &user_token, &[Role::Admin]));
        assert!(has_role(&tokens, &admin_token, &[Role::Admin]));
        assert!(!has_role(&tokens, "garbage", &[Role::Admin]));
    }

    #[test]
    fn test_authorize_maps_failures_to_typed_errors() {
        let tokens = service();
        let user_token = tokens.issue(1, "alice", Role::User.as_id()).unwrap();

        // Bad token -> authentication error
        match authorize(&tokens, "garbage", AccessRequirement::Authenticated) {
            Err(PortalError::Authentication(_)) => {}
            other => panic!("expected Authentication error, got {:?}", other.map(|_| ())),
        }

        // Good token, missing role -> authorization error
        match authorize(&tokens, &user_token, AccessRequirement::Elevated) {
            Err(PortalError::Authorization(_)) => {}
            other => panic!("expected Authorization error, got {:?}", other.map(|_| ())),
        }

        // Good token, satisfied requirement -> claims
        let c = authorize(&tokens, &user_token, AccessRequirement::Authenticated).unwrap();
        assert_eq!(c.user_id, 1);
    }

    #[test]
    fn test_actor_id_override_is_admin_only() {
        let admin = claims(1, Role::Admin.as_id());
        let user = claims(5, Role::User.as_id());

        assert_eq!(resolve_actor_id(&admin, Some(9)), 9);
        assert_eq!(resolve_actor_id(&admin, None), 1);
        // Ordinary callers always act as themselves
        assert_eq!(resolve_actor_id(&user, Some(9)), 5);
        assert_eq!(resolve_actor_id(&user, Some(5)), 5);
        assert_eq!(resolve_actor_id(&user, None), 5);
    }

    #[test]
    fn test_is_authenticated_delegates_to_verification() {
        let tokens = service();
        let token = tokens.issue(1, "alice", 1).unwrap();
        assert!(is_authenticated(&tokens, &token));
        assert!(!is_authenticated(&tokens, "nope"));
    }
}
