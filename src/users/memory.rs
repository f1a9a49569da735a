//! In-memory [`UserStore`] used by the unit and router tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::users::repo::{StoreResult, UserStore};
use crate::users::repo_types::{NewUser, User, UserPatch};

#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Rows>,
    offline: AtomicBool,
}

#[derive(Default)]
struct Rows {
    next_id: i32,
    users: Vec<User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the store were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().expect("rows lock").users.len()
    }

    pub fn get(&self, id: i32) -> Option<User> {
        let rows = self.rows.lock().expect("rows lock");
        rows.users.iter().find(|u| u.id == id).cloned()
    }

    /// Insert without the service's pre-check, as a concurrent request would.
    pub fn insert_raw(&self, name: &str, email: &str, password: &str) -> i32 {
        let mut rows = self.rows.lock().expect("rows lock");
        rows.next_id += 1;
        let id = rows.next_id;
        rows.users.push(User {
            id,
            name: name.into(),
            email: email.into(),
            password: password.into(),
            created_at: OffsetDateTime::now_utc(),
        });
        id
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "connection refused (127.0.0.1:5432)".into(),
            ));
        }
        Ok(())
    }
}

fn duplicate_email() -> StoreError {
    StoreError::UniqueViolation(
        "duplicate key value violates unique constraint \"users_email_key\"".into(),
    )
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        self.check_online()?;
        let rows = self.rows.lock().expect("rows lock");
        Ok(rows.users.iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<()> {
        self.check_online()?;
        if self.rows.lock().expect("rows lock").users.iter().any(|u| u.email == user.email) {
            return Err(duplicate_email());
        }
        self.insert_raw(&user.name, &user.email, &user.password);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        self.check_online()?;
        Ok(self.rows.lock().expect("rows lock").users.clone())
    }

    async fn update(&self, id: i32, patch: &UserPatch) -> StoreResult<u64> {
        self.check_online()?;
        let mut rows = self.rows.lock().expect("rows lock");
        if !rows.users.iter().any(|u| u.id == id) {
            return Ok(0);
        }
        if let Some(email) = &patch.email {
            if rows.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(duplicate_email());
            }
        }
        let Some(user) = rows.users.iter_mut().find(|u| u.id == id) else {
            return Ok(0);
        };
        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(password) = &patch.password {
            user.password = password.clone();
        }
        Ok(1)
    }

    async fn delete(&self, id: i32) -> StoreResult<u64> {
        self.check_online()?;
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.users.len();
        rows.users.retain(|u| u.id != id);
        Ok((before - rows.users.len()) as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_online()
    }
}
