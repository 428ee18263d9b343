//! Dashboard accounts.
//!
//! Accounts only gate access; the record workflows never look at who is
//! calling. Passwords are stored as salted SHA-256 digests.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{EngineError, PersistenceError, ResultEngine};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Users table.
pub mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub email: String,
        pub password_hash: String,
        pub salt: String,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// A sign-up form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    pub fn validate(&self) -> ResultEngine<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(EngineError::Validation(format!("invalid email: {email}")));
        }
        if self.password != self.confirm_password {
            return Err(EngineError::Validation(
                "password and confirmation do not match".to_string(),
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Hex SHA-256 of `salt` and `password`.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct Accounts {
    database: DatabaseConnection,
}

impl Accounts {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Stores a new account. An email already registered is a conflict.
    pub async fn register(&self, registration: &Registration) -> ResultEngine<()> {
        registration.validate()?;
        let email = normalize_email(&registration.email);

        let existing = users::Entity::find_by_id(email.clone())
            .one(&self.database)
            .await
            .map_err(PersistenceError::from)?;
        if existing.is_some() {
            return Err(EngineError::Conflict(format!("account {email}")));
        }

        let salt = Uuid::new_v4().simple().to_string();
        users::ActiveModel {
            email: ActiveValue::Set(email.clone()),
            password_hash: ActiveValue::Set(hash_password(&registration.password, &salt)),
            salt: ActiveValue::Set(salt),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await
        .map_err(PersistenceError::from)?;

        tracing::info!(%email, "account registered");
        Ok(())
    }

    /// Returns `true` when `password` belongs to the account `email`.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<bool> {
        let user = users::Entity::find_by_id(normalize_email(email))
            .one(&self.database)
            .await
            .map_err(PersistenceError::from)?;
        Ok(user.is_some_and(|user| hash_password(password, &user.salt) == user.password_hash))
    }
}
