pub mod account;
pub mod attendance;
pub mod auth_service;
pub mod calendar;
pub mod certificates;
pub mod clock;
pub mod contact;
pub mod content;
pub mod event_registration;
pub mod formatting;
pub mod notifications;
pub mod pagination;
pub mod research;
pub mod uploads;
pub mod validation;
