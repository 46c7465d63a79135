//! # IO Module
//!
//! The adapter layer between HTTP clients and the domain services. Requests
//! are translated into domain commands, results into the envelopes defined in
//! the `shared` crate, and domain errors into status codes.

pub mod rest;
