/// Identity records and the store that owns them
///
/// Emails are unique and compared case-sensitively. The store only ever sees
/// password hashes.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::IdentityError;

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new identity, password already hashed
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: u32,
}

pub trait IdentityStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Identity, IdentityError>;

    /// Fails with `AlreadyExists` when the email is taken
    fn create_identity(&self, fields: NewIdentity) -> Result<Identity, IdentityError>;

    fn get_by_id(&self, id: Uuid) -> Result<Identity, IdentityError>;

    /// Removing an unknown id is a no-op
    fn delete(&self, id: Uuid);

    fn all(&self) -> Vec<Identity>;
}

#[derive(Default)]
pub struct InMemoryIdentityStore {
    identities: RwLock<HashMap<Uuid, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Identity>> {
        self.identities
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Identity>> {
        self.identities
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn find_by_email(&self, email: &str) -> Result<Identity, IdentityError> {
        self.read()
            .values()
            .find(|identity| identity.email == email)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound("user with that email".to_string()))
    }

    fn create_identity(&self, fields: NewIdentity) -> Result<Identity, IdentityError> {
        // Uniqueness check and insert share one write lock
        let mut identities = self.write();

        if identities.values().any(|identity| identity.email == fields.email) {
            return Err(IdentityError::AlreadyExists("user already exists".to_string()));
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            name: fields.name,
            email: fields.email,
            password_hash: fields.password_hash,
            age: fields.age,
            created_at: Utc::now(),
        };
        identities.insert(identity.id, identity.clone());

        Ok(identity)
    }

    fn get_by_id(&self, id: Uuid) -> Result<Identity, IdentityError> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(format!("user with id {}", id)))
    }

    fn delete(&self, id: Uuid) {
        self.write().remove(&id);
    }

    fn all(&self) -> Vec<Identity> {
        let mut identities: Vec<Identity> = self.read().values().cloned().collect();
        identities.sort_by_key(|identity| identity.created_at);
        identities
    }
}
