use std::sync::Arc;

use quiz_core::model::{User, UserId};
use storage::repository::UserRepository;

use crate::Clock;
use crate::error::UserServiceError;

/// Creates, renames and removes quiz owners.
#[derive(Clone)]
pub struct UserService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    /// Create and persist a user.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` for a blank name.
    /// Returns `UserServiceError::Storage` if persistence fails.
    pub async fn create_user(&self, name: impl Into<String>) -> Result<UserId, UserServiceError> {
        let user = User::new(UserId::generate(), name, self.clock.now())?;
        self.users.upsert_user(&user).await?;
        tracing::info!(user = %user.id(), "created user");
        Ok(user.id())
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::NotFound` if the user does not exist and
    /// `UserServiceError::User` for a blank name.
    pub async fn rename_user(
        &self,
        id: UserId,
        name: impl Into<String>,
    ) -> Result<(), UserServiceError> {
        let user = self
            .users
            .get_user(id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(id.to_string()))?;
        self.users.upsert_user(&user.renamed(name)?).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn delete_user(&self, id: UserId) -> Result<(), UserServiceError> {
        self.users.delete_user(id).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, UserServiceError> {
        Ok(self.users.get_user(id).await?)
    }

    /// Users ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.users.list_users().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service() -> UserService {
        UserService::new(Clock::fixed(fixed_now()), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn create_user_trims_and_stamps() {
        let service = service();
        let id = service.create_user("  Grace  ").await.unwrap();

        let user = service.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.name(), "Grace");
        assert_eq!(user.created_at(), fixed_now());
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let service = service();
        let err = service.create_user("   ").await.unwrap_err();
        assert!(matches!(err, UserServiceError::User(_)));
        assert!(service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rename_and_delete() {
        let service = service();
        let id = service.create_user("Grace").await.unwrap();

        service.rename_user(id, "Grace H.").await.unwrap();
        assert_eq!(service.get_user(id).await.unwrap().unwrap().name(), "Grace H.");

        let missing = service.rename_user(UserId::generate(), "x").await.unwrap_err();
        assert!(matches!(missing, UserServiceError::NotFound(_)));

        service.delete_user(id).await.unwrap();
        assert!(service.get_user(id).await.unwrap().is_none());
    }
}
