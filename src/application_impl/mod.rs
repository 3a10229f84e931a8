mod auth_pipeline;
mod auth_service_impl;
mod jwt_codec;
mod password_hasher;
mod resource_authorizer;
mod session_validator;
mod token_issuer;

pub use auth_pipeline::*;
pub use auth_service_impl::*;
pub use jwt_codec::*;
pub use password_hasher::*;
pub use resource_authorizer::*;
pub use session_validator::*;
pub use token_issuer::*;
