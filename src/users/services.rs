use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::error::{StoreError, UserError};
use crate::users::dto::CreateUserRequest;
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User, UserPatch};

/// Stateless user operations over an injected store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Validates the payload, rejects a taken email, then inserts.
    /// Returns the stored user's name.
    #[instrument(skip_all)]
    pub async fn create(&self, payload: CreateUserRequest) -> Result<String, UserError> {
        let user: NewUser = payload.validate().inspect_err(|e| {
            warn!(error = %e, "create rejected");
        })?;

        if self.store.email_exists(&user.email).await.map_err(log_store("email_exists"))? {
            warn!(email = %user.email, "email already registered");
            return Err(UserError::Conflict);
        }

        match self.store.insert(&user).await {
            Ok(()) => {
                info!(email = %user.email, "user created");
                Ok(user.name)
            }
            // lost the race against a concurrent insert of the same email
            Err(StoreError::UniqueViolation(msg)) => {
                warn!(email = %user.email, error = %msg, "unique violation on insert");
                Err(UserError::Conflict)
            }
            Err(e) => Err(log_store("insert")(e)),
        }
    }

    #[instrument(skip_all)]
    pub async fn list_all(&self) -> Result<Vec<User>, UserError> {
        self.store.list().await.map_err(log_store("list"))
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i32, patch: UserPatch) -> Result<(), UserError> {
        if patch.is_empty() {
            warn!("update without fields");
            return Err(UserError::Validation("No fields provided for update".into()));
        }

        let matched = self.store.update(id, &patch).await.map_err(log_store("update"))?;
        if matched == 0 {
            warn!("update target missing");
            return Err(UserError::NotFound(id));
        }
        info!("user updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), UserError> {
        let deleted = self.store.delete(id).await.map_err(log_store("delete"))?;
        if deleted == 0 {
            warn!("delete target missing");
            return Err(UserError::NotFound(id));
        }
        info!("user deleted");
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.ping().await.inspect_err(|e| {
            error!(error = %e, "store ping failed");
        })
    }
}

fn log_store(op: &'static str) -> impl Fn(StoreError) -> UserError {
    move |e| {
        error!(error = %e, op, "store call failed");
        UserError::from(e)
    }
}
