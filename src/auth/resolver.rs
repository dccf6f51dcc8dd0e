/// Maps token subjects and refresh-token owners to identity records.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::IdentityError;
use crate::identity::{Identity, IdentityStore};

#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn IdentityStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Look up the identity an access token claims to belong to
    pub fn resolve_subject(&self, subject: &str) -> Option<Identity> {
        self.store.find_by_email(subject).ok()
    }

    pub fn resolve_user_id(&self, user_id: Uuid) -> Result<Identity, IdentityError> {
        self.store.get_by_id(user_id)
    }

    /// The subject a token must carry to authenticate `identity`
    pub fn expected_subject(identity: &Identity) -> &str {
        &identity.email
    }

    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }
}
