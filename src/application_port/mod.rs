mod auth_service;
mod claims_codec;

pub use auth_service::*;
pub use claims_codec::*;
