mod account;
mod context;
mod token;

pub use account::*;
pub use context::*;
pub use token::*;
