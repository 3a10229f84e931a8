use crate::application_impl::SessionValidator;
use crate::application_port::AuthError;
use crate::domain_model::*;
use crate::logger::*;
use std::sync::Arc;

/// Per-request authentication: extracted token, validated, identity bound.
/// Any failure short-circuits; the request goes no further.
#[derive(Clone)]
pub struct AuthPipeline {
    validator: Arc<SessionValidator>,
}

impl AuthPipeline {
    pub fn new(validator: Arc<SessionValidator>) -> Self {
        Self { validator }
    }

    pub async fn authenticate(&self, access_token: Option<&str>) -> Result<RequestContext, AuthError> {
        let token = match access_token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::MissingToken),
        };

        match self.validator.validate(token, TokenKind::Access).await {
            Ok(claims) => Ok(RequestContext::bound(claims.account_id)),
            Err(e) => {
                if e.is_unauthenticated() {
                    debug!(reason = %e, "request rejected");
                } else {
                    warn!(reason = %e, "request rejected");
                }
                Err(e)
            }
        }
    }
}
