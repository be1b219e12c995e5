pub mod errors;
pub mod token;

pub use errors::InvitationTokenError;
pub use token::InvitationToken;
