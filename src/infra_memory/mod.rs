mod account_repo_memory;
mod session_store_memory;

pub use account_repo_memory::*;
pub use session_store_memory::*;
