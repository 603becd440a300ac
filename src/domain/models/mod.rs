pub mod activity;
pub mod attendance;
pub mod auth;
pub mod certificate;
pub mod contact;
pub mod event;
pub mod gallery;
pub mod opportunity;
pub mod registration;
pub mod research;
pub mod student;
pub mod team;
