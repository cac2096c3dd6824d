pub mod airtable;
pub mod config;
pub mod error;
pub mod routes;

pub use error::Error;
