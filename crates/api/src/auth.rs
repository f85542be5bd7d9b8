// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identity and tenant authorization.
//!
//! Identity is resolved upstream. This layer only validates the supplied
//! `(user, dealer, role)` triple and enforces dealer scoping.

use std::str::FromStr;
use workbay_audit::Actor;

use crate::error::AuthError;

/// Caller roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Workshop floor staff.
    Technician,
    /// Front-desk staff handling customers and estimates.
    ServiceAdvisor,
    /// Dealer management.
    Manager,
    /// Platform operators. The only role allowed to act across dealers.
    PlatformAdmin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Technician => "technician",
            Self::ServiceAdvisor => "service_advisor",
            Self::Manager => "manager",
            Self::PlatformAdmin => "platform_admin",
        }
    }

    /// Returns true if the role may act on another dealer's records.
    #[must_use]
    pub const fn is_cross_tenant(&self) -> bool {
        matches!(self, Self::PlatformAdmin)
    }

    /// Returns true if the role may acknowledge or resolve escalations.
    #[must_use]
    pub const fn can_handle_escalations(&self) -> bool {
        !matches!(self, Self::Technician)
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technician" => Ok(Self::Technician),
            "service_advisor" => Ok(Self::ServiceAdvisor),
            "manager" => Ok(Self::Manager),
            "platform_admin" => Ok(Self::PlatformAdmin),
            other => Err(AuthError::AuthenticationFailed {
                reason: format!("Unknown role '{other}'"),
            }),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    /// The caller's user identifier.
    pub user_id: String,
    /// The dealer the caller is acting for.
    pub dealer_id: i64,
    /// The caller's role.
    pub role: Role,
}

impl CallerContext {
    #[must_use]
    pub const fn new(user_id: String, dealer_id: i64, role: Role) -> Self {
        Self {
            user_id,
            dealer_id,
            role,
        }
    }

    /// The audit actor recorded for this caller's writes.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::user(self.user_id.clone())
    }
}

/// Builds a caller from raw identity values supplied by the gateway.
///
/// # Arguments
///
/// * `user_id` - The user identifier, if present
/// * `dealer_id` - The dealer identifier as text, if present
/// * `role` - The role name, if present
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` if any value is missing,
/// empty, or malformed.
pub fn authenticate(
    user_id: Option<&str>,
    dealer_id: Option<&str>,
    role: Option<&str>,
) -> Result<CallerContext, AuthError> {
    let user_id: &str = user_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AuthError::AuthenticationFailed {
            reason: String::from("Missing user identity"),
        })?;

    let dealer_id: i64 = dealer_id
        .ok_or_else(|| AuthError::AuthenticationFailed {
            reason: String::from("Missing dealer identity"),
        })?
        .trim()
        .parse()
        .map_err(|_| AuthError::AuthenticationFailed {
            reason: String::from("Dealer identity must be an integer"),
        })?;

    let role: Role = role
        .ok_or_else(|| AuthError::AuthenticationFailed {
            reason: String::from("Missing role"),
        })?
        .trim()
        .parse()?;

    Ok(CallerContext::new(user_id.to_string(), dealer_id, role))
}

/// Authorization service for enforcing dealer scoping and role checks.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the caller may act on a record owned by `dealer_id`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` if the record belongs to another
    /// dealer and the caller has no cross-tenant role.
    pub fn authorize_dealer(
        caller: &CallerContext,
        dealer_id: i64,
        action: &str,
    ) -> Result<(), AuthError> {
        if caller.dealer_id == dealer_id || caller.role.is_cross_tenant() {
            return Ok(());
        }

        Err(AuthError::Forbidden {
            action: action.to_string(),
            reason: format!(
                "caller acts for dealer {}, record belongs to dealer {dealer_id}",
                caller.dealer_id
            ),
        })
    }

    /// Checks that the caller may acknowledge or resolve an escalation.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` for technicians.
    pub fn authorize_escalation_handling(
        caller: &CallerContext,
        action: &str,
    ) -> Result<(), AuthError> {
        if caller.role.can_handle_escalations() {
            return Ok(());
        }

        Err(AuthError::Forbidden {
            action: action.to_string(),
            reason: format!("role '{}' cannot handle escalations", caller.role.as_str()),
        })
    }
}
