mod auth;
mod envelope;
mod token_create;

pub use auth::*;
pub use envelope::*;
pub use token_create::*;
