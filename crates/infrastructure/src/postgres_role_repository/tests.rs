use folio_application::{RoleGrantRepository, UserGroupRepository};
use folio_domain::{LegacyRoleId, RoleContext};

use super::{PostgresRoleGrantRepository, PostgresUserGroupRepository};
use crate::postgres_test_support::{insert_journal, insert_user, test_pool};

#[tokio::test]
async fn site_grants_match_null_context_and_ignore_duplicates() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleGrantRepository::new(pool.clone());
    let user_id = insert_user(&pool).await;

    for _ in 0..2 {
        let inserted = repository
            .insert_role_grant(user_id, "admin", RoleContext::Site)
            .await;
        assert!(inserted.is_ok());
    }

    let stored_context = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT context_id FROM user_account_roles WHERE user_id = $1",
    )
    .bind(user_id.as_uuid())
    .fetch_all(&pool)
    .await
    .unwrap_or_else(|error| panic!("failed to read grants: {error}"));
    assert_eq!(stored_context, vec![None]);

    assert!(matches!(
        repository
            .has_role_grant(user_id, "admin", RoleContext::Site)
            .await,
        Ok(true)
    ));

    let removed = repository
        .delete_role_grant(user_id, "admin", RoleContext::Site)
        .await;
    assert!(matches!(removed, Ok(1)));
}

#[tokio::test]
async fn journal_grants_are_scoped_to_their_context() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleGrantRepository::new(pool.clone());
    let user_id = insert_user(&pool).await;
    let journal_id = insert_journal(&pool).await;
    let other_journal = insert_journal(&pool).await;

    let inserted = repository
        .insert_role_grant(user_id, "editor", RoleContext::Journal(journal_id))
        .await;
    assert!(inserted.is_ok());

    assert!(matches!(
        repository
            .has_role_grant(user_id, "editor", RoleContext::Journal(other_journal))
            .await,
        Ok(false)
    ));
    assert!(matches!(
        repository
            .count_role_grants("editor", RoleContext::Journal(journal_id))
            .await,
        Ok(1)
    ));

    let grants = repository
        .list_role_grants_for_user(user_id)
        .await
        .unwrap_or_else(|error| panic!("failed to list grants: {error}"));
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].context, RoleContext::Journal(journal_id));
}

#[tokio::test]
async fn legacy_site_membership_accepts_zero_and_null_context() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserGroupRepository::new(pool.clone());
    let zero_member = insert_user(&pool).await;
    let null_member = insert_user(&pool).await;

    let zero_group = repository
        .create_user_group(RoleContext::Site, LegacyRoleId::SITE_ADMIN, false)
        .await
        .unwrap_or_else(|error| panic!("failed to create site group: {error}"));
    let null_group = sqlx::query_scalar::<_, i64>(
        "INSERT INTO user_groups (context_id, role_id) VALUES (NULL, 1) RETURNING user_group_id",
    )
    .fetch_one(&pool)
    .await
    .unwrap_or_else(|error| panic!("failed to insert null-context group: {error}"));

    assert!(repository
        .add_membership(zero_group.user_group_id, zero_member)
        .await
        .is_ok());
    assert!(repository.add_membership(null_group, null_member).await.is_ok());

    for member in [zero_member, null_member] {
        assert!(matches!(
            repository
                .has_site_membership(member, LegacyRoleId::SITE_ADMIN)
                .await,
            Ok(true)
        ));
    }
}

#[tokio::test]
async fn journal_membership_checks_role_ids_and_removal_counts_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserGroupRepository::new(pool.clone());
    let user_id = insert_user(&pool).await;
    let journal_id = insert_journal(&pool).await;
    let context = RoleContext::Journal(journal_id);

    let groups = repository
        .find_user_groups(context, LegacyRoleId::REVIEWER)
        .await
        .unwrap_or_else(|error| panic!("failed to find groups: {error}"));
    assert_eq!(groups.len(), 1);
    assert!(groups[0].is_default);

    assert!(repository
        .add_membership(groups[0].user_group_id, user_id)
        .await
        .is_ok());
    assert!(repository
        .add_membership(groups[0].user_group_id, user_id)
        .await
        .is_ok());

    assert!(matches!(
        repository
            .has_journal_membership(user_id, journal_id, &[LegacyRoleId::MANAGER])
            .await,
        Ok(false)
    ));
    assert!(matches!(
        repository
            .has_journal_membership(
                user_id,
                journal_id,
                &[LegacyRoleId::MANAGER, LegacyRoleId::REVIEWER]
            )
            .await,
        Ok(true)
    ));

    let memberships = repository
        .list_memberships_for_user(user_id)
        .await
        .unwrap_or_else(|error| panic!("failed to list memberships: {error}"));
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].context, context);

    let removed = repository
        .remove_memberships(user_id, &[groups[0].user_group_id])
        .await;
    assert!(matches!(removed, Ok(1)));
}

#[tokio::test]
async fn unmapped_flat_contexts_are_skipped_when_listing() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleGrantRepository::new(pool.clone());
    let user_id = insert_user(&pool).await;
    let journal_id = insert_journal(&pool).await;

    let seeded = repository
        .insert_role_grant(user_id, "editor", RoleContext::Journal(journal_id))
        .await;
    assert!(seeded.is_ok());
    for context_id in [0_i64, -4] {
        let raw = sqlx::query(
            "INSERT INTO user_account_roles (user_id, role_name, context_id) VALUES ($1, 'admin', $2)",
        )
        .bind(user_id.as_uuid())
        .bind(context_id)
        .execute(&pool)
        .await;
        assert!(raw.is_ok());
    }

    let grants = repository
        .list_role_grants_for_user(user_id)
        .await
        .unwrap_or_else(|error| panic!("failed to list grants: {error}"));
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].context, RoleContext::Journal(journal_id));

    assert!(matches!(
        repository
            .has_role_grant(user_id, "admin", RoleContext::Site)
            .await,
        Ok(false)
    ));
}
