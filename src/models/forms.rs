// Form inputs collected by the host and attendee pages

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

fn require(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Host-side form for `create_event`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventForm {
    pub event_name: String,
    pub host_name: String,
    pub date: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
}

impl CreateEventForm {
    pub fn validate(&self) -> AppResult<()> {
        require(&self.event_name, "event_name")?;
        require(&self.host_name, "host_name")?;
        require(&self.date, "date")?;
        require(&self.location, "location")?;
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|e| {
            AppError::Validation(format!("date must be YYYY-MM-DD: {}", e))
        })?;
        Ok(())
    }
}

/// Attendee-side form for `sign_in`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub x_handle: String,
    #[serde(default)]
    pub tg_handle: String,
}

impl SignInForm {
    pub fn validate(&self) -> AppResult<()> {
        require(&self.name, "name")
    }
}
