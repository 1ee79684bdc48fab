//! Flight-dynamics evaluation engine.
//!
//! A vehicle is described declaratively: a property tree of named scalars,
//! a graph of interpolated-table and arithmetic functions over those
//! properties, and per-axis bindings that aggregate function outputs into
//! body-frame forces and moments. This crate loads such descriptions from
//! YAML, keeps the derived air-data properties fresh from host-supplied
//! kinematics, and evaluates the graph once per tick.
//!
//! ```no_run
//! use airframe::config::load_model;
//! use airframe::model::Kinematics;
//! use nalgebra::Vector3;
//!
//! # fn main() -> Result<(), airframe::utils::ConfigError> {
//! let mut model = load_model("craft.yaml")?;
//! model.set_kinematics(&Kinematics {
//!     velocity: Vector3::new(50.0, 0.0, 2.0),
//!     altitude: 1200.0,
//!     ..Default::default()
//! });
//! let (force, torque) = model.step(0.02);
//! # let _ = (force, torque);
//! # Ok(())
//! # }
//! ```

pub mod atmosphere;
pub mod components;
pub mod config;
pub mod functions;
pub mod model;
pub mod properties;
pub mod utils;

pub use config::load_model;
pub use model::{AxisDimension, DynamicsModel, Kinematics, ModelSnapshot};
pub use properties::{PropertyId, PropertyStore};
pub use utils::{ConfigError, ModelError};
