//! Dynamic form core
//!
//! Everything needed to turn a JSON Schema + UI-hint pair into a live form:
//! - `types`: the shared schema/hint model and the joint parse operation
//! - `interpreter`: initial values, validation rules, coercion, render plan
//! - `builder`: the Schema Studio field-descriptor model and its
//!   bidirectional (lossy) transform to and from the schema pair

pub mod builder;
pub mod interpreter;
pub mod types;

pub use types::*;
