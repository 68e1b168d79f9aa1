//! Member management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppResult,
    models::member::{Member, MemberInput, MemberPatch},
    repository::MembersStore,
};

#[derive(Clone)]
pub struct MembersService {
    members: Arc<dyn MembersStore>,
}

impl MembersService {
    pub fn new(members: Arc<dyn MembersStore>) -> Self {
        Self { members }
    }

    pub async fn list(&self, search: Option<String>) -> AppResult<Vec<Member>> {
        self.members.list(search).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Member> {
        self.members.get_by_id(id).await
    }

    pub async fn create(&self, member: MemberInput) -> AppResult<Member> {
        member.validate()?;
        let created = self.members.create(&member).await?;
        tracing::info!(member_id = created.id, "Member created");
        Ok(created)
    }

    pub async fn update(&self, id: i32, member: MemberInput) -> AppResult<Member> {
        member.validate()?;
        self.members.update(id, &member).await
    }

    pub async fn patch(&self, id: i32, patch: MemberPatch) -> AppResult<Member> {
        let current = self.members.get_by_id(id).await?;
        self.update(id, patch.apply(&current)).await
    }

    /// Delete a member together with their loans
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.members.delete(id).await?;
        tracing::info!(member_id = id, "Member deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, repository::MockMembersStore};

    #[tokio::test]
    async fn test_invalid_email_is_rejected() {
        let mut store = MockMembersStore::new();
        store.expect_update().never();

        let service = MembersService::new(Arc::new(store));
        let result = service
            .update(3, MemberInput { name: "Bob".into(), email: "bob-at-example".into() })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
