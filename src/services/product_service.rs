use crate::{
    dto::products::{CreateProductRequest, PriceInput, ProductList, UpdateProductRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
};

fn stored_price(input: &PriceInput, field: &str) -> AppResult<String> {
    input
        .to_stored()
        .ok_or_else(|| AppError::BadRequest(format!("{field} must be a non-negative amount")))
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let needle = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let products: Vec<Product> = state
        .store
        .list::<Product>()
        .await
        .into_iter()
        .filter(|p| {
            needle
                .as_deref()
                .is_none_or(|needle| p.title.to_lowercase().contains(needle))
        })
        .collect();

    let (products, meta) = query.pagination().apply(products);
    Ok(ApiResponse::success("Products", ProductList { products }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<ApiResponse<Product>> {
    let product = state
        .store
        .get::<Product>(id)
        .await
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user, &state.config)?;

    let title = payload
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("title is required".into()))?;
    let price = payload
        .price
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("price is required".into()))
        .and_then(|p| stored_price(p, "price"))?;
    let old_price = payload
        .old_price
        .as_ref()
        .map(|p| stored_price(p, "oldPrice"))
        .transpose()?;

    let product = Product {
        id: 0,
        title,
        price,
        old_price,
        image: payload.image.unwrap_or_default(),
        badge: payload.badge.filter(|b| !b.is_empty()),
    };
    let product = state.store.insert(product).await?;
    tracing::info!(product_id = product.id, "product created");

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user, &state.config)?;

    // Validate before taking the write cycle so a bad price writes nothing.
    let price = payload
        .price
        .as_ref()
        .map(|p| stored_price(p, "price"))
        .transpose()?;
    let old_price = payload
        .old_price
        .as_ref()
        .map(|p| stored_price(p, "oldPrice"))
        .transpose()?;

    let product = state
        .store
        .update(id, |product: &mut Product| {
            if let Some(title) = payload.title {
                product.title = title;
            }
            if let Some(price) = price {
                product.price = price;
            }
            if let Some(old_price) = old_price {
                product.old_price = Some(old_price);
            }
            if let Some(image) = payload.image {
                product.image = image;
            }
            if let Some(badge) = payload.badge {
                product.badge = Some(badge).filter(|b| !b.is_empty());
            }
        })
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user, &state.config)?;

    // Reviews keep pointing at the removed id.
    if !state.store.remove::<Product>(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(product_id = %id, "product deleted");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
