mod name;
mod store;

pub use name::PropName;
pub use store::{Property, PropertyId, PropertyStore};
