use async_trait::async_trait;

use folio_application::{
    RoleGrant, RoleGrantRepository, UserGroup, UserGroupMembership, UserGroupRepository,
};
use folio_core::{AppResult, JournalId, UserId};
use folio_domain::{LegacyRoleId, RoleContext};

use super::InMemoryStore;

#[async_trait]
impl RoleGrantRepository for InMemoryStore {
    async fn has_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.grants.iter().any(|grant| {
            grant.user_id == user_id && grant.role_name == role_name && grant.context == context
        }))
    }

    async fn insert_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let exists = state.grants.iter().any(|grant| {
            grant.user_id == user_id && grant.role_name == role_name && grant.context == context
        });
        if !exists {
            state.grants.push(RoleGrant {
                user_id,
                role_name: role_name.to_owned(),
                context,
            });
        }

        Ok(())
    }

    async fn delete_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.grants.len();
        state.grants.retain(|grant| {
            !(grant.user_id == user_id && grant.role_name == role_name && grant.context == context)
        });

        Ok((before - state.grants.len()) as u64)
    }

    async fn list_role_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleGrant>> {
        let state = self.state.read().await;
        Ok(state
            .grants
            .iter()
            .filter(|grant| grant.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_role_grants(&self, role_name: &str, context: RoleContext) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .grants
            .iter()
            .filter(|grant| grant.role_name == role_name && grant.context == context)
            .count() as i64)
    }
}

#[async_trait]
impl UserGroupRepository for InMemoryStore {
    async fn has_site_membership(
        &self,
        user_id: UserId,
        role_id: LegacyRoleId,
    ) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.memberships.iter().any(|(group_id, member)| {
            *member == user_id
                && state.groups.get(group_id).is_some_and(|group| {
                    group.role_id == role_id && group.context == RoleContext::Site
                })
        }))
    }

    async fn count_site_memberships(&self, role_id: LegacyRoleId) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .filter(|(group_id, _)| {
                state.groups.get(group_id).is_some_and(|group| {
                    group.role_id == role_id && group.context == RoleContext::Site
                })
            })
            .count() as i64)
    }

    async fn has_journal_membership(
        &self,
        user_id: UserId,
        journal_id: JournalId,
        role_ids: &[LegacyRoleId],
    ) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.memberships.iter().any(|(group_id, member)| {
            *member == user_id
                && state.groups.get(group_id).is_some_and(|group| {
                    group.context == RoleContext::Journal(journal_id)
                        && role_ids.contains(&group.role_id)
                })
        }))
    }

    async fn find_user_groups(
        &self,
        context: RoleContext,
        role_id: LegacyRoleId,
    ) -> AppResult<Vec<UserGroup>> {
        let state = self.state.read().await;
        Ok(state
            .groups
            .values()
            .filter(|group| group.context == context && group.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn create_user_group(
        &self,
        context: RoleContext,
        role_id: LegacyRoleId,
        is_default: bool,
    ) -> AppResult<UserGroup> {
        let mut state = self.state.write().await;
        let group = UserGroup {
            user_group_id: state.next_id(),
            role_id,
            context,
            is_default,
        };
        state.groups.insert(group.user_group_id, group.clone());

        Ok(group)
    }

    async fn add_membership(&self, user_group_id: i64, user_id: UserId) -> AppResult<()> {
        self.state
            .write()
            .await
            .memberships
            .insert((user_group_id, user_id));
        Ok(())
    }

    async fn remove_memberships(&self, user_id: UserId, user_group_ids: &[i64]) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.memberships.len();
        state
            .memberships
            .retain(|(group_id, member)| !(*member == user_id && user_group_ids.contains(group_id)));

        Ok((before - state.memberships.len()) as u64)
    }

    async fn list_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserGroupMembership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .filter(|(_, member)| *member == user_id)
            .filter_map(|(group_id, member)| {
                state.groups.get(group_id).map(|group| UserGroupMembership {
                    user_group_id: *group_id,
                    user_id: *member,
                    role_id: group.role_id,
                    context: group.context,
                })
            })
            .collect())
    }
}
