//! User account ports and application service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use folio_core::{AppError, AppResult, NonEmptyString, UserId, UserIdentity};
use folio_domain::{EmailAddress, LegacyRoleId, RoleContext, RolePath, validate_password};

use crate::{
    RoleGrantRepository, RoleResolver, RoleSyncReport, RoleSyncService, UserGroupRepository,
};


/// Account projection without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Account identifier.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Name shown in dashboards.
    pub display_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Returns the session identity for this account.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.id, self.display_name.as_str(), self.email.as_str())
    }
}

/// Account together with its stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// Account projection.
    pub account: UserAccount,
    /// Argon2id PHC string.
    pub password_hash: String,
}

/// Validated row for a new account.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    /// Login email.
    pub email: EmailAddress,
    /// Name shown in dashboards.
    pub display_name: NonEmptyString,
    /// Argon2id PHC string.
    pub password_hash: String,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct RegisterUserInput {
    /// Login email.
    pub email: String,
    /// Name shown in dashboards.
    pub display_name: String,
    /// Plaintext password.
    pub password: String,
}

/// Repository port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates an account. Duplicate emails are a conflict.
    async fn create_user(&self, record: NewUserRecord) -> AppResult<UserAccount>;

    /// Finds an account by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>>;

    /// Finds an account and its password hash by normalized email.
    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>>;

    /// Lists all accounts ordered by email.
    async fn list_users(&self) -> AppResult<Vec<UserAccount>>;

    /// Updates the display name.
    async fn update_display_name(
        &self,
        user_id: UserId,
        display_name: &str,
    ) -> AppResult<Option<UserAccount>>;

    /// Deletes an account together with its role rows. Returns whether a row was removed.
    async fn delete_user(&self, user_id: UserId) -> AppResult<bool>;
}

/// Port for password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Application service for account administration and login.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    grant_repository: Arc<dyn RoleGrantRepository>,
    group_repository: Arc<dyn UserGroupRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    resolver: RoleResolver,
    role_sync_service: RoleSyncService,
}

impl UserService {
    /// Creates a new service from its dependencies.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        grant_repository: Arc<dyn RoleGrantRepository>,
        group_repository: Arc<dyn UserGroupRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        resolver: RoleResolver,
        role_sync_service: RoleSyncService,
    ) -> Self {
        Self {
            user_repository,
            grant_repository,
            group_repository,
            password_hasher,
            resolver,
            role_sync_service,
        }
    }

    /// Checks an email and password pair.
    ///
    /// Unknown emails and wrong passwords both yield `None`.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<UserAccount>> {
        let normalized = email.trim().to_lowercase();
        let Some(credentials) = self
            .user_repository
            .find_credentials_by_email(normalized.as_str())
            .await?
        else {
            // Keep the response time of unknown emails close to wrong passwords.
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        };

        if self
            .password_hasher
            .verify_password(password, credentials.password_hash.as_str())?
        {
            return Ok(Some(credentials.account));
        }

        Ok(None)
    }

    /// Creates the first site administrator.
    ///
    /// Refused once any account is a site administrator in either role store.
    pub async fn bootstrap_site_admin(
        &self,
        input: RegisterUserInput,
    ) -> AppResult<(UserAccount, RoleSyncReport)> {
        let flat_admins = self
            .grant_repository
            .count_role_grants(RolePath::Admin.as_str(), RoleContext::Site)
            .await?;
        let legacy_admins = self
            .group_repository
            .count_site_memberships(LegacyRoleId::SITE_ADMIN)
            .await?;
        if flat_admins > 0 || legacy_admins > 0 {
            return Err(AppError::Conflict(
                "a site administrator already exists".to_owned(),
            ));
        }

        let account = self.create_account(input).await?;
        let report = self
            .role_sync_service
            .grant_role_unchecked(account.id, RolePath::Admin, RoleContext::Site)
            .await?;

        info!(user_id = %account.id, "bootstrapped site administrator");
        Ok((account, report))
    }

    /// Creates an account. Site administrators only.
    pub async fn register_user(
        &self,
        actor: &UserIdentity,
        input: RegisterUserInput,
    ) -> AppResult<UserAccount> {
        self.resolver
            .require_site_role(actor, RolePath::Admin)
            .await?;

        let account = self.create_account(input).await?;
        info!(actor = %actor.user_id(), user_id = %account.id, "user registered");
        Ok(account)
    }

    /// Lists every account. Site administrators only.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<UserAccount>> {
        self.resolver
            .require_site_role(actor, RolePath::Admin)
            .await?;
        self.user_repository.list_users().await
    }

    /// Returns one account to its owner or a site administrator.
    pub async fn get_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<UserAccount> {
        self.require_self_or_admin(actor, user_id).await?;
        self.user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }

    /// Updates the display name of an account.
    pub async fn update_display_name(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        display_name: &str,
    ) -> AppResult<UserAccount> {
        self.require_self_or_admin(actor, user_id).await?;
        let display_name = NonEmptyString::new(display_name.trim())?;

        self.user_repository
            .update_display_name(user_id, display_name.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }

    /// Deletes an account. Site administrators only, and never their own account.
    pub async fn delete_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<()> {
        self.resolver
            .require_site_role(actor, RolePath::Admin)
            .await?;

        if actor.user_id() == user_id {
            return Err(AppError::Validation(
                "administrators cannot delete their own account".to_owned(),
            ));
        }

        if !self.user_repository.delete_user(user_id).await? {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        info!(actor = %actor.user_id(), %user_id, "user deleted");
        Ok(())
    }

    async fn create_account(&self, input: RegisterUserInput) -> AppResult<UserAccount> {
        let email = EmailAddress::new(input.email)?;
        let display_name = NonEmptyString::new(input.display_name.trim())?;
        validate_password(input.password.as_str())?;
        let password_hash = self.password_hasher.hash_password(input.password.as_str())?;

        self.user_repository
            .create_user(NewUserRecord {
                email,
                display_name,
                password_hash,
            })
            .await
    }

    async fn require_self_or_admin(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<()> {
        if actor.user_id() == user_id {
            return Ok(());
        }

        self.resolver
            .require_site_role(actor, RolePath::Admin)
            .await
    }
}
