//! Request handlers

pub mod health;
pub mod users;
pub mod verification;
pub mod requests;
