//! Typed attribute values exchanged with the host plan framework.
//!
//! This module provides the value model the reconciliation engine operates on:
//! - A closed sum type over attribute kinds with explicit null and unknown states
//! - Records (attribute maps) and typed collections of records
//! - The JSON codec used at file and host boundaries

mod types;
mod json;

pub use types::{Collection, ListValue, ObjectType, Record, Value};
pub use json::UNKNOWN_MARKER;
