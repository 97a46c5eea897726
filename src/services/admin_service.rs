use chrono::Local;

use crate::{
    analytics::{self, DateRange},
    dto::{auth::UserProfile, stats::AdminStats, users::UserList},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, Product, Review, User},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, StatsQuery},
    state::AppState,
};

pub async fn stats(
    state: &AppState,
    user: &AuthUser,
    query: StatsQuery,
) -> AppResult<ApiResponse<AdminStats>> {
    ensure_admin(user, &state.config)?;
    let range = DateRange::resolve(query.start, query.end, Local::now().date_naive())?;

    let users = state.store.list::<User>().await;
    let orders = state.store.list::<Order>().await;
    let reviews = state.store.list::<Review>().await;
    let products = state.store.list::<Product>().await;

    let stats = analytics::compute(&users, &orders, &reviews, &products, &range);
    Ok(ApiResponse::success("Stats", stats, Some(Meta::empty())))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user, &state.config)?;

    let users: Vec<UserProfile> = state
        .store
        .list::<User>()
        .await
        .into_iter()
        .map(|u| {
            let is_admin = state.config.is_admin_email(&u.email);
            UserProfile::new(u, is_admin)
        })
        .collect();

    let (users, meta) = pagination.apply(users);
    Ok(ApiResponse::success("Users", UserList { users }, Some(meta)))
}

/// Orders placed by the user are kept; they keep the dangling `userId`.
pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user, &state.config)?;

    if !state.store.remove::<User>(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(user_id = %id, "user deleted");

    Ok(ApiResponse::success(
        "User deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
