// Transaction Intent Builder - Describes contract calls without signing or sending them

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::package::{ATTENDANCE_STRUCT, CAPABILITY_STRUCT, REGISTRY_STRUCT};
use crate::core::{Address, ContractPackage, ObjectId};
use crate::error::{AppError, AppResult};
use crate::framework::classifier::HostReferences;
use crate::models::{CreateEventForm, SignInForm};

/// Contract entry points this client calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractFunction {
    CreateEvent,
    SignIn,
    AddFriend,
}

impl ContractFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractFunction::CreateEvent => "create_event",
            ContractFunction::SignIn => "sign_in",
            ContractFunction::AddFriend => "add_friend",
        }
    }

    /// Positional parameter count of the entry point
    pub fn arity(self) -> usize {
        match self {
            ContractFunction::CreateEvent => 7,
            ContractFunction::SignIn => 5,
            ContractFunction::AddFriend => 3,
        }
    }
}

impl fmt::Display for ContractFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IntentArgument {
    Object(ObjectId),
    String(String),
    Address(Address),
}

/// A contract call ready to be handed to a signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
    pub package: ContractPackage,
    pub function: ContractFunction,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<IntentArgument>,
}

impl TransactionIntent {
    /// `{package}::{module}::{function}`
    pub fn target(&self) -> String {
        self.package.qualify(self.function.as_str())
    }

    fn argument(&self, index: usize) -> AppResult<&IntentArgument> {
        self.arguments.get(index).ok_or_else(|| {
            AppError::Validation(format!("{} has no argument {}", self.function, index))
        })
    }

    pub fn object_arg(&self, index: usize) -> AppResult<&ObjectId> {
        match self.argument(index)? {
            IntentArgument::Object(id) => Ok(id),
            other => Err(AppError::Validation(format!(
                "{} argument {} is not an object: {:?}",
                self.function, index, other
            ))),
        }
    }

    pub fn string_arg(&self, index: usize) -> AppResult<&str> {
        match self.argument(index)? {
            IntentArgument::String(value) => Ok(value),
            other => Err(AppError::Validation(format!(
                "{} argument {} is not a string: {:?}",
                self.function, index, other
            ))),
        }
    }

    pub fn address_arg(&self, index: usize) -> AppResult<&Address> {
        match self.argument(index)? {
            IntentArgument::Address(address) => Ok(address),
            other => Err(AppError::Validation(format!(
                "{} argument {} is not an address: {:?}",
                self.function, index, other
            ))),
        }
    }
}

fn missing(what: &str) -> AppError {
    AppError::MissingReference(format!("{} object has not been resolved", what))
}

/// Builds intents in the contract's fixed parameter order
#[derive(Debug, Clone)]
pub struct IntentBuilder {
    package: ContractPackage,
}

impl IntentBuilder {
    pub fn new(package: ContractPackage) -> Self {
        Self { package }
    }

    fn intent(&self, function: ContractFunction, arguments: Vec<IntentArgument>) -> TransactionIntent {
        debug_assert_eq!(arguments.len(), function.arity());
        TransactionIntent {
            package: self.package.clone(),
            function,
            type_arguments: Vec::new(),
            arguments,
        }
    }

    /// `create_event(adminCap, registry, name, date, location, description, hostName)`
    pub fn create_event(
        &self,
        refs: &HostReferences,
        form: &CreateEventForm,
    ) -> AppResult<TransactionIntent> {
        let capability = refs.capability.clone().ok_or_else(|| missing(CAPABILITY_STRUCT))?;
        let registry = refs.registry.clone().ok_or_else(|| missing(REGISTRY_STRUCT))?;
        Ok(self.intent(
            ContractFunction::CreateEvent,
            vec![
                IntentArgument::Object(capability),
                IntentArgument::Object(registry),
                IntentArgument::String(form.event_name.clone()),
                IntentArgument::String(form.date.clone()),
                IntentArgument::String(form.location.clone()),
                IntentArgument::String(form.description.clone()),
                IntentArgument::String(form.host_name.clone()),
            ],
        ))
    }

    /// `sign_in(event, name, description, xHandle, tgHandle)`
    pub fn sign_in(&self, event_id: &ObjectId, form: &SignInForm) -> TransactionIntent {
        self.intent(
            ContractFunction::SignIn,
            vec![
                IntentArgument::Object(event_id.clone()),
                IntentArgument::String(form.name.clone()),
                IntentArgument::String(form.description.clone()),
                IntentArgument::String(form.x_handle.clone()),
                IntentArgument::String(form.tg_handle.clone()),
            ],
        )
    }

    /// `add_friend(event, attendance, friendAddress)`
    pub fn add_friend(
        &self,
        event_id: &ObjectId,
        attendance_id: Option<&ObjectId>,
        friend: &Address,
    ) -> AppResult<TransactionIntent> {
        let attendance_id = attendance_id.ok_or_else(|| missing(ATTENDANCE_STRUCT))?;
        Ok(self.intent(
            ContractFunction::AddFriend,
            vec![
                IntentArgument::Object(event_id.clone()),
                IntentArgument::Object(attendance_id.clone()),
                IntentArgument::Address(friend.clone()),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> IntentBuilder {
        IntentBuilder::new(ContractPackage::new("0xpkg", "attendance"))
    }

    fn form() -> CreateEventForm {
        CreateEventForm {
            event_name: "Demo".into(),
            host_name: "Host".into(),
            date: "2025-07-01".into(),
            location: "Online".into(),
            description: "desc".into(),
        }
    }

    #[test]
    fn test_create_event_requires_capability() {
        let refs = HostReferences {
            capability: None,
            registry: Some(ObjectId::from("0xreg")),
        };
        let err = builder().create_event(&refs, &form()).unwrap_err();
        assert!(matches!(err, AppError::MissingReference(ref msg) if msg.contains("AdminCap")));
    }

    #[test]
    fn test_create_event_requires_registry() {
        let refs = HostReferences {
            capability: Some(ObjectId::from("0xcap")),
            registry: None,
        };
        assert!(matches!(
            builder().create_event(&refs, &form()),
            Err(AppError::MissingReference(_))
        ));
    }

    #[test]
    fn test_create_event_argument_order() {
        let refs = HostReferences {
            capability: Some(ObjectId::from("0xcap")),
            registry: Some(ObjectId::from("0xreg")),
        };
        let intent = builder().create_event(&refs, &form()).unwrap();
        assert_eq!(intent.target(), "0xpkg::attendance::create_event");
        assert!(intent.type_arguments.is_empty());
        assert_eq!(
            intent.arguments,
            vec![
                IntentArgument::Object(ObjectId::from("0xcap")),
                IntentArgument::Object(ObjectId::from("0xreg")),
                IntentArgument::String("Demo".into()),
                IntentArgument::String("2025-07-01".into()),
                IntentArgument::String("Online".into()),
                IntentArgument::String("desc".into()),
                IntentArgument::String("Host".into()),
            ]
        );
    }

    #[test]
    fn test_sign_in_and_add_friend() {
        let b = builder();
        let form = SignInForm {
            name: "Alice".into(),
            description: String::new(),
            x_handle: "@a".into(),
            tg_handle: "@t".into(),
        };
        let sign_in = b.sign_in(&ObjectId::from("0xev"), &form);
        assert_eq!(sign_in.target(), "0xpkg::attendance::sign_in");
        assert_eq!(sign_in.string_arg(3).unwrap(), "@a");
        assert!(sign_in.address_arg(0).is_err());

        let friend = Address::parse("0xb0b").unwrap();
        assert!(matches!(
            b.add_friend(&ObjectId::from("0xev"), None, &friend),
            Err(AppError::MissingReference(_))
        ));
        let add = b
            .add_friend(&ObjectId::from("0xev"), Some(&ObjectId::from("0xatt")), &friend)
            .unwrap();
        assert_eq!(add.object_arg(1).unwrap(), &ObjectId::from("0xatt"));
        assert_eq!(add.address_arg(2).unwrap(), &friend);
    }

    #[test]
    fn test_intent_serializes_for_signer() {
        let intent = builder().sign_in(&ObjectId::from("0xev"), &SignInForm::default());
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["function"], "sign_in");
        assert_eq!(value["arguments"][0]["kind"], "object");
        assert_eq!(value["arguments"][0]["value"], "0xev");
    }
}
