use crate::application_port::{AuthError, ClaimsCodec, TokenGrant, VerifiedToken};
use crate::domain_model::*;
use chrono::{DateTime, TimeDelta};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SignedClaims {
    id: String,
    kind: TokenKind,
    jti: String,
    iss: String,
    iat: i64,
    nbf: i64,
    exp: i64,
}

fn decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed,
    }
}

/// HMAC-SHA256 signed JWTs. Keys are derived once from the shared secret.
pub struct JwtHs256Codec {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[cfg.issuer.clone()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        JwtHs256Codec {
            issuer: cfg.issuer,
            encoding_key: EncodingKey::from_secret(&cfg.signing_key),
            decoding_key: DecodingKey::from_secret(&cfg.signing_key),
            validation,
        }
    }
}

impl ClaimsCodec for JwtHs256Codec {
    fn encode(&self, claims: &Claims, grant: &TokenGrant) -> Result<String, AuthError> {
        let exp_dt = TimeDelta::from_std(grant.ttl)
            .ok()
            .and_then(|ttl| grant.issued_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::InternalError(format!("token ttl out of range: {:?}", grant.ttl))
            })?;
        let signed = SignedClaims {
            id: claims.account_id.0.clone(),
            kind: grant.kind,
            jti: grant.jti.clone(),
            iss: self.issuer.clone(),
            iat: grant.issued_at.timestamp(),
            nbf: grant.issued_at.timestamp(),
            exp: exp_dt.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &signed, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let data = decode::<SignedClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| decode_error(e.kind()))?;
        let signed = data.claims;
        let expires_at = DateTime::from_timestamp(signed.exp, 0).ok_or(AuthError::Malformed)?;
        Ok(VerifiedToken {
            claims: Claims::new(AccountId(signed.id)),
            kind: signed.kind,
            jti: signed.jti,
            expires_at,
        })
    }
}
