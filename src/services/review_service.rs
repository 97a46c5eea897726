use chrono::Local;
use uuid::Uuid;

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    error::{AppError, AppResult},
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::ReviewQuery,
    state::AppState,
};

pub async fn list_reviews(state: &AppState, query: ReviewQuery) -> AppResult<ApiResponse<ReviewList>> {
    let reviews: Vec<Review> = state
        .store
        .list::<Review>()
        .await
        .into_iter()
        .filter(|r| {
            query
                .product_id
                .as_deref()
                .is_none_or(|product_id| r.product_id == product_id)
        })
        .collect();

    let meta = Meta::total(reviews.len());
    Ok(ApiResponse::success("Reviews", ReviewList { reviews }, Some(meta)))
}

pub async fn get_review(state: &AppState, id: &str) -> AppResult<ApiResponse<Review>> {
    let review = state
        .store
        .get::<Review>(id)
        .await
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Review", review, None))
}

/// The rating range is deliberately not checked here.
pub async fn create_review(
    state: &AppState,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let (Some(user_name), Some(rating), Some(product_id)) = (
        payload.user_name.filter(|n| !n.trim().is_empty()),
        payload.rating,
        payload.product_id.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "userName, rating and productId are required".into(),
        ));
    };

    let review = Review {
        id: Uuid::new_v4().to_string(),
        user_id: payload.user_id,
        user_name,
        rating,
        comment: payload.comment.unwrap_or_default(),
        date: Local::now().fixed_offset().to_rfc3339(),
        product_id,
    };
    let review = state.store.insert(review).await?;
    tracing::info!(review_id = %review.id, product_id = %review.product_id, "review created");

    Ok(ApiResponse::success("Review created", review, Some(Meta::empty())))
}

pub async fn update_review(
    state: &AppState,
    id: &str,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let review = state
        .store
        .update(id, |review: &mut Review| {
            if let Some(rating) = payload.rating {
                review.rating = rating;
            }
            if let Some(comment) = payload.comment {
                review.comment = comment;
            }
        })
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Review updated", review, Some(Meta::empty())))
}

pub async fn delete_review(state: &AppState, id: &str) -> AppResult<ApiResponse<serde_json::Value>> {
    if !state.store.remove::<Review>(id).await? {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Review deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
