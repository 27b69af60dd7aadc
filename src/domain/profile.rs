use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The owner of the ledger. At most one profile is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Path or URI of the profile picture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Profile {
    /// Create a profile with a freshly generated id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: generate_profile_id(),
            name: name.into(),
            email: email.into(),
            avatar: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Apply the fields set in `update`, keeping everything else.
    pub fn merged(self, update: ProfileUpdate) -> Self {
        Self {
            id: self.id,
            name: update.name.unwrap_or(self.name),
            email: update.email.unwrap_or(self.email),
            avatar: update.avatar.unwrap_or(self.avatar),
        }
    }
}

/// Partial change to a [`Profile`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    /// `Some(None)` clears the avatar
    pub avatar: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn avatar(mut self, avatar: Option<String>) -> Self {
        self.avatar = Some(avatar);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.avatar.is_none()
    }
}

/// Ids look like `user_<uuid v7>`, so they sort by creation time.
pub fn generate_profile_id() -> String {
    format!("user_{}", Uuid::now_v7().simple())
}
