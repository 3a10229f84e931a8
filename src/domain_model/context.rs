use crate::domain_model::AccountId;

/// Identity bound to one request after the access token was validated.
/// Handed explicitly to every downstream handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub account_id: AccountId,
}

impl RequestContext {
    pub fn bound(account_id: AccountId) -> Self {
        Self { account_id }
    }
}
