#![doc = "The `taskwarden` library crate."]
#![doc = ""]
#![doc = "Core business logic for the TaskWarden API: the session lifecycle"]
#![doc = "(login, logout, refresh, password change) built on a two-token JWT"]
#![doc = "scheme with a revocation deny-list, the storage capabilities it runs"]
#![doc = "on, owner-scoped task CRUD, routing configuration, and error"]
#![doc = "handling. The binary (`main.rs`) assembles the application from"]
#![doc = "these pieces."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
