// store

mod session_store;

pub use session_store::*;

// repo

mod account_repo;

pub use account_repo::*;
