pub mod delivery;
pub mod repositories;
