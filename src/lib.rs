// src/lib.rs

//! roster-sync library
//!
//! Reads leaderboards and participant rosters from a scoring platform and
//! reconciles them into an organization's member collection.

pub mod config;
pub mod error;
pub mod handlers;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
