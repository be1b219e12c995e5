pub mod authentication;
pub mod authorization;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod invitation;
pub mod report;
pub mod tenancy;
pub mod work_order;
