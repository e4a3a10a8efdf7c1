//! v1 API Data Transfer Objects.
//!
//! These types define the wire format for the v1 REST API. They are kept
//! separate from the domain models in `src/models/` and own the conversion
//! from search outcomes to JSON.

pub mod search;

pub use search::*;
