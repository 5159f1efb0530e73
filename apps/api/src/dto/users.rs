use folio_application::{RegisterUserInput, UserAccount};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for account creation by an administrator.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

impl From<CreateUserRequest> for RegisterUserInput {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            email: value.email,
            display_name: value.display_name,
            password: value.password,
        }
    }
}

/// Incoming payload for profile updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    pub display_name: String,
}

/// API representation of an account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
}

impl From<UserAccount> for UserResponse {
    fn from(value: UserAccount) -> Self {
        Self {
            user_id: value.id.to_string(),
            email: value.email,
            display_name: value.display_name,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}
