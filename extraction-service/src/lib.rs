//! Identity-document extraction service.
//!
//! Accepts an uploaded ID image on `POST /fireworks`, recompresses it and asks
//! a hosted vision model to fill in the [`models::Person`] schema.

pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
