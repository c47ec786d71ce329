// Library crate for integration tests.
// main.rs drives the server through this crate.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod drafts;
pub mod error;
pub mod form;
pub mod results;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod submission;
pub mod trigger;
