use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Process-local user table. The username index is claimed before the
/// row is inserted, so two concurrent registrations cannot both succeed.
#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<UserId, UserRecord>,
    by_username: DashMap<String, UserId>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, user: &UserRecord) -> Result<(), StoreError> {
        match self.by_username.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(user.username.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.user_id.clone());
                self.users.insert(user.user_id.clone(), user.clone());
                Ok(())
            }
        }
    }

    async fn get_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(user_id).map(|r| r.value().clone()))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let Some(user_id) = self.by_username.get(username).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        self.get_by_id(&user_id).await
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        patch: &ProfilePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(mut user) = self.users.get_mut(user_id) {
            if let Some(nickname) = &patch.nickname {
                user.nickname = nickname.clone();
            }
            if let Some(email) = &patch.email {
                user.email = Some(email.clone());
            }
            if let Some(phone) = &patch.phone {
                user.phone = Some(phone.clone());
            }
            user.updated_at = updated_at;
        }
        Ok(())
    }

    async fn update_password(
        &self,
        user_id: &UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(mut user) = self.users.get_mut(user_id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = updated_at;
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), StoreError> {
        if let Some((_, user)) = self.users.remove(user_id) {
            self.by_username.remove(&user.username);
        }
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<(Vec<UserRecord>, i64), StoreError> {
        let mut all: Vec<UserRecord> = self.users.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size() as usize)
            .collect();
        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            user_id: UserId::generate(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            nickname: username.to_string(),
            email: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let repo = MemoryUserRepo::new();
        repo.create(&record("alice")).await.unwrap();
        assert!(matches!(
            repo.create(&record("alice")).await,
            Err(StoreError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn delete_frees_username() {
        let repo = MemoryUserRepo::new();
        let alice = record("alice");
        repo.create(&alice).await.unwrap();
        repo.delete(&alice.user_id).await.unwrap();
        assert!(repo.get_by_username("alice").await.unwrap().is_none());
        repo.create(&record("alice")).await.unwrap();
    }

    #[tokio::test]
    async fn password_update_keeps_profile() {
        let repo = MemoryUserRepo::new();
        let mut alice = record("alice");
        alice.email = Some("alice@example.com".to_string());
        repo.create(&alice).await.unwrap();

        repo.update_password(&alice.user_id, "new-hash", Utc::now())
            .await
            .unwrap();

        let stored = repo.get_by_id(&alice.user_id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");
        assert_eq!(stored.email.as_deref(), Some("alice@example.com"));
        assert_eq!(stored.nickname, "alice");
    }
}
