use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Entity, MemoryRepo};

/// A user profile. The password is write-only: accepted on register and
/// update, never serialized back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_savings: Option<Decimal>,
    #[serde(skip_serializing, default)]
    password: String,
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The shape the profile endpoints answer with: extended fields are stored
/// but deliberately dropped from these responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Present-field partial update over the profile.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_savings: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Clone, Default)]
pub struct UserStore {
    repo: Arc<RwLock<MemoryRepo<User>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, username: String, email: String, password: String) -> Result<User, String> {
        let mut repo = self.repo.write().expect("user store poisoned");
        if repo.find(|u| u.email == email).is_some() {
            return Err("Email already registered".into());
        }
        let user = User {
            id: repo.mint_id(),
            username,
            email,
            age: None,
            gender: None,
            monthly_income: None,
            total_savings: None,
            password,
        };
        repo.insert(user.clone());
        Ok(user)
    }

    // Mock-level credential check: plaintext equality, nothing more.
    pub fn login(&self, email: &str, password: &str) -> Option<User> {
        self.repo
            .read()
            .expect("user store poisoned")
            .find(|u| u.email == email && u.password == password)
            .cloned()
    }

    pub fn profile(&self, id: &str) -> Option<Profile> {
        self.repo
            .read()
            .expect("user store poisoned")
            .get(id)
            .map(Profile::from)
    }

    pub fn update(&self, id: &str, patch: UserUpdate) -> Option<Profile> {
        self.repo
            .write()
            .expect("user store poisoned")
            .update(id, |user| {
                if let Some(username) = patch.username {
                    user.username = username;
                }
                if let Some(email) = patch.email {
                    user.email = email;
                }
                if let Some(age) = patch.age {
                    user.age = Some(age);
                }
                if let Some(gender) = patch.gender {
                    user.gender = Some(gender);
                }
                if let Some(income) = patch.monthly_income {
                    user.monthly_income = Some(income);
                }
                if let Some(savings) = patch.total_savings {
                    user.total_savings = Some(savings);
                }
                if let Some(password) = patch.password {
                    user.password = password;
                }
            })
            .map(|user| Profile::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> (UserStore, User) {
        let store = UserStore::new();
        let user = store
            .register("alice".into(), "alice@example.com".into(), "hunter2".into())
            .unwrap();
        (store, user)
    }

    #[test]
    fn register_then_login_round_trips() {
        let (store, user) = registered();
        let logged_in = store.login("alice@example.com", "hunter2").unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(store.login("alice@example.com", "wrong").is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (store, _) = registered();
        assert!(store
            .register("bob".into(), "alice@example.com".into(), "pw".into())
            .is_err());
    }

    #[test]
    fn password_never_appears_in_serialized_users() {
        let (_, user) = registered();
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
    }

    #[test]
    fn update_with_only_age_keeps_identity_fields() {
        let (store, user) = registered();
        let profile = store
            .update(
                &user.id,
                UserUpdate {
                    age: Some(30),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.email, "alice@example.com");
    }

    #[test]
    fn profile_misses_for_unknown_id() {
        let store = UserStore::new();
        assert!(store.profile("123").is_none());
    }
}
