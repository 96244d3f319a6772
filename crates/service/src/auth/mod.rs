//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and token verification live here so the HTTP layer
//! only deals with cookies and redirects.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
