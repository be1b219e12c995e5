pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::authorization;
pub use domain::identity;
pub use domain::invitation;
pub use outbound::repositories;
