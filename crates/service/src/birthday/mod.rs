//! Birthdays and their congratulations: domain views, forms, persistence and
//! the service enforcing login/author rules.

pub mod domain;
pub mod forms;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::BirthdayService;
