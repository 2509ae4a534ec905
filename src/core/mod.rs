// Core types shared by every layer

pub mod package;
pub mod strong_types;

pub use package::ContractPackage;
pub use strong_types::{Address, Network, ObjectId};
