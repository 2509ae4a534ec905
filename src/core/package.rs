// Contract package coordinates - package id plus module name

use serde::{Deserialize, Serialize};
use std::fmt;

/// Struct names the contract declares for its objects and events
pub const CAPABILITY_STRUCT: &str = "AdminCap";
pub const REGISTRY_STRUCT: &str = "Events";
pub const ATTENDANCE_STRUCT: &str = "Attendance";
pub const EVENT_STRUCT: &str = "Event";
pub const EVENT_CREATED_STRUCT: &str = "EventCreated";

/// Address of the external contract module all calls and type tags refer to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractPackage {
    pub package_id: String,
    pub module: String,
}

impl ContractPackage {
    pub fn new(package_id: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            module: module.into(),
        }
    }

    /// Fully qualified `{package}::{module}::{name}`
    pub fn qualify(&self, name: &str) -> String {
        format!("{}::{}::{}", self.package_id, self.module, name)
    }
}

impl fmt::Display for ContractPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.package_id, self.module)
    }
}
