//! Physical state components feeding the function graph: geometry and mass
//! ([`Vehicle`]), host kinematics ([`Motion`]), air data ([`Aero`]) and
//! control surfaces ([`FlightControlSys`]).

mod aero;
mod controls;
mod motion;
mod vehicle;

pub use aero::Aero;
pub use controls::FlightControlSys;
pub use motion::Motion;
pub use vehicle::{Location, Vehicle};
