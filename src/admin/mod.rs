//! Administrative operations on user records

use crate::auth::{Role, UserSummary};
use crate::error::Result;
use crate::store::UserStore;

/// Every user, without password hashes
pub async fn list_users(users: &dyn UserStore) -> Result<Vec<UserSummary>> {
    let all = users.list().await?;
    Ok(all.into_iter().map(UserSummary::from).collect())
}

/// Set a user's role.
///
/// Unconditional: no self-demotion guard, and an unknown id is a no-op.
/// Sessions already issued to the user keep their old role.
pub async fn set_role(users: &dyn UserStore, user_id: &str, role: Role) -> Result<()> {
    if users.set_role(user_id, role).await? {
        tracing::info!("Set role of user {} to {}", user_id, role);
    } else {
        tracing::debug!("Role change to {} matched no user with id {}", role, user_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NewUser;
    use crate::store::MemoryStore;

    async fn seed(store: &MemoryStore, name: &str, email: &str) -> String {
        store
            .insert(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_list_users_projection() {
        let store = MemoryStore::new();
        seed(&store, "alice1", "a@x.com").await;
        seed(&store, "bob1", "b@x.com").await;

        let users = list_users(&store).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "alice1");
        assert_eq!(users[1].email, "b@x.com");
    }

    #[tokio::test]
    async fn test_promote_and_demote() {
        let store = MemoryStore::new();
        let bob = seed(&store, "bob1", "b@x.com").await;

        set_role(&store, &bob, Role::Admin).await.unwrap();
        assert_eq!(list_users(&store).await.unwrap()[0].role, Role::Admin);

        set_role(&store, &bob, Role::User).await.unwrap();
        assert_eq!(list_users(&store).await.unwrap()[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_unknown_id_is_ok() {
        let store = MemoryStore::new();
        assert!(set_role(&store, "does-not-exist", Role::Admin).await.is_ok());
    }
}
