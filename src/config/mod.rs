//! Vehicle-description documents: serde schema, unit tags, include
//! resolution and assembly into a [`DynamicsModel`](crate::model::DynamicsModel).

pub mod document;
mod loader;
mod parser;
pub mod units;

pub use document::VehicleDocument;
pub use loader::{load_document, load_model};
pub use parser::build_model;
