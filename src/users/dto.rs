use serde::{Deserialize, Serialize};

use crate::error::UserError;
use crate::users::repo_types::{NewUser, UserPatch};

/// Request body for user creation. Fields are optional here so that a missing
/// one is reported by name instead of as a generic decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(self) -> Result<NewUser, UserError> {
        let missing = |field: &str| UserError::Validation(format!("missing field '{field}'"));

        let name = self.name.ok_or_else(|| missing("name"))?;
        let email = self.email.ok_or_else(|| missing("email"))?;
        let password = self.password.ok_or_else(|| missing("password"))?;

        if name.is_empty() {
            return Err(UserError::Validation("field 'name' must not be empty".into()));
        }

        Ok(NewUser {
            name,
            email,
            password,
        })
    }
}

/// Request body for partial update. `null` and `""` mean "not supplied".
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        let supplied = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            name: supplied(req.name),
            email: supplied(req.email),
            password: supplied(req.password),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response returned after a successful create.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub message: &'static str,
    pub name: String,
}
