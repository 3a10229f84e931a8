use crate::application_port::AuthError;
use crate::domain_model::*;

/// Ownership check for path-addressed resources. Must run after the auth
/// pipeline bound an identity; without one it denies.
pub fn authorize(bound: Option<&RequestContext>, resource_owner: &AccountId) -> Result<(), AuthError> {
    match bound {
        Some(ctx) if &ctx.account_id == resource_owner => Ok(()),
        _ => Err(AuthError::Forbidden),
    }
}
