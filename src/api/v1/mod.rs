mod session_cookie;
mod error;
mod handler;
mod router;

pub use session_cookie::*;
pub use error::{ApiErrorCode, recover_error};
pub use router::routes;
