// src/lib.rs

pub mod config;
pub mod db;
pub mod repositories;
pub mod platforms;
pub mod services;
pub mod test_utils;

pub use db::Database;
pub use ticketbot_common::error::Error;
pub use ticketbot_common::models;
