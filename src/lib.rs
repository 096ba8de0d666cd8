//! Grocery purchase lists, dish lists and product nutrition over an embedded store,
//! with spending rankings and voice-command navigation.

#[macro_use]
extern crate diesel;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod numerals;
mod query;
pub mod ranking;
pub mod repository;
mod schema;
pub mod state;
pub mod store;
pub mod voice;

pub use config::Config;
pub use error::Error;
pub use store::Store;
