//! In-memory user repository implementation

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserPage, UserQuery, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Store {
    /// Users keyed by id; BTreeMap keeps iteration in insertion order
    users: BTreeMap<i64, User>,
    /// Index for username -> user id lookup
    username_index: HashMap<String, i64>,
    /// Last assigned id; ids are never reused
    last_id: i64,
}

/// In-memory implementation of `UserRepository`
///
/// A single write lock covers the uniqueness check and the insert, so the
/// unique-username invariant holds under concurrent creation.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let mut store = self.store.write().await;

        if store.username_index.contains_key(&new_user.username) {
            return Err(DomainError::conflict(format!(
                "username '{}' is already taken",
                new_user.username
            )));
        }

        let id = store.last_id + 1;
        store.last_id = id;

        let user = User::new(id, new_user.username.clone(), new_user.age, Utc::now());
        store.username_index.insert(new_user.username, id);
        store.users.insert(id, user.clone());

        Ok(user)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, DomainError> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn list(&self, query: &UserQuery) -> Result<UserPage, DomainError> {
        let store = self.store.read().await;

        let matches: Vec<&User> = store
            .users
            .values()
            .filter(|user| match query.keyword.as_deref() {
                Some(keyword) => user.username().contains(keyword),
                None => true,
            })
            .collect();

        let total = matches.len() as i64;
        let offset = usize::try_from(query.offset).unwrap_or(0);
        let limit = usize::try_from(query.limit).unwrap_or(0);

        let users: Vec<User> = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(UserPage { users, total })
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, DomainError> {
        let store = self.store.read().await;
        Ok(store.username_index.contains_key(username))
    }

    async fn delete_all(&self) -> Result<u64, DomainError> {
        let mut store = self.store.write().await;
        let removed = store.users.len() as u64;
        // last_id stays put so ids are never reused
        store.users.clear();
        store.username_index.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, age: i64) -> NewUser {
        NewUser {
            username: username.to_string(),
            age,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(new_user("alice", 25)).await.unwrap();
        let second = repo.create(new_user("bob", 30)).await.unwrap();

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert!(first.created_at() <= second.created_at());
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("alice", 25)).await.unwrap();

        let retrieved = repo.get(created.id()).await.unwrap();
        assert_eq!(retrieved, Some(created));

        let missing = repo.get(999_999).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("alice", 25)).await.unwrap();

        let result = repo.create(new_user("alice", 30)).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_creation_single_winner() {
        let repo = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.create(new_user("racer", 20)).await })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(DomainError::Conflict { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 7);

        let page = repo
            .list(&UserQuery {
                keyword: Some("racer".to_string()),
                limit: 100,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_delete_all_keeps_ids_monotonic() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("alice", 25)).await.unwrap();
        repo.create(new_user("bob", 30)).await.unwrap();

        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert!(!repo.exists_by_username("alice").await.unwrap());

        // The freed username is usable again, the freed ids are not
        let next = repo.create(new_user("alice", 25)).await.unwrap();
        assert_eq!(next.id(), 3);
    }

    #[tokio::test]
    async fn test_exists_by_username() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("alice", 25)).await.unwrap();

        assert!(repo.exists_by_username("alice").await.unwrap());
        assert!(!repo.exists_by_username("bob").await.unwrap());
        // Exact match only
        assert!(!repo.exists_by_username("Alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_insertion_order_and_window() {
        let repo = InMemoryUserRepository::new();
        for (name, age) in [("alice", 25), ("bob", 30), ("carol", 22), ("dave", 41)] {
            repo.create(new_user(name, age)).await.unwrap();
        }

        let page = repo
            .list(&UserQuery {
                keyword: None,
                limit: 2,
                offset: 1,
            })
            .await
            .unwrap();

        let names: Vec<&str> = page.users.iter().map(User::username).collect();
        assert_eq!(names, vec!["bob", "carol"]);
        // Total ignores the window
        assert_eq!(page.total, 4);
    }

    #[tokio::test]
    async fn test_list_keyword_is_case_sensitive_substring() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("alice_chen", 25)).await.unwrap();
        repo.create(new_user("malice", 30)).await.unwrap();
        repo.create(new_user("Alina", 28)).await.unwrap();

        let page = repo
            .list(&UserQuery {
                keyword: Some("ali".to_string()),
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap();

        let names: Vec<&str> = page.users.iter().map(User::username).collect();
        assert_eq!(names, vec!["alice_chen", "malice"]);
        assert_eq!(page.total, 2);
    }
}
