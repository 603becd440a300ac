pub mod email;
pub mod factory;
pub mod payment;
pub mod repositories;
pub mod templates;
