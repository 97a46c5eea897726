use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::auth::UserProfile;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub users: Vec<UserProfile>,
}
