use chrono::Local;

use crate::{
    dto::orders::{OrderList, PlaceOrderRequest, PlaceOrderResponse, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus, User},
    notify,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    state::AppState,
};

pub async fn list_my_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let orders: Vec<Order> = state
        .store
        .list::<Order>()
        .await
        .into_iter()
        .filter(|o| o.user_id.as_deref() == Some(user.user_id.as_str()))
        .collect();

    let meta = Meta::total(orders.len());
    Ok(ApiResponse::success("Ok", OrderList { orders }, Some(meta)))
}

/// Persists a checkout submission as a `Pending` order.
///
/// The order is the only step whose failure fails the call. Clearing the
/// caller's saved cart and the notification emails come after it and never
/// turn a stored order into an error response.
pub async fn place_order(
    state: &AppState,
    caller: Option<&AuthUser>,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<PlaceOrderResponse>> {
    let customer = payload
        .customer
        .ok_or_else(|| AppError::BadRequest("customer is required".into()))?;
    let items = payload
        .items
        .filter(|items| !items.is_empty())
        .ok_or_else(|| AppError::BadRequest("items are required".into()))?;
    let total = payload
        .total_amount
        .ok_or_else(|| AppError::BadRequest("totalAmount is required".into()))?;

    let order = Order {
        id: String::new(),
        user_id: caller.map(|c| c.user_id.clone()),
        date: Local::now().fixed_offset().to_rfc3339(),
        status: OrderStatus::Pending,
        total,
        items,
        customer,
        payment_method: payload.payment_method,
    };
    let order = state.store.insert(order).await?;
    tracing::info!(order_id = %order.id, total = order.total, "order placed");

    if let Some(caller) = caller {
        if let Err(err) = state
            .store
            .update(&caller.user_id, |user: &mut User| user.cart.clear())
            .await
        {
            tracing::warn!(error = %err, user_id = %caller.user_id, "clearing cart failed");
        }
    }

    notify::dispatch(
        state.notifier.clone(),
        notify::new_order_for_store(&order, &state.config.store_email),
    );
    if !order.customer.email.is_empty() {
        notify::dispatch(state.notifier.clone(), notify::order_confirmation(&order));
    }

    Ok(ApiResponse::success(
        "Order placed",
        PlaceOrderResponse {
            message: "Order placed successfully".into(),
            order_id: order.id,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user, &state.config)?;

    let mut orders: Vec<Order> = state
        .store
        .list::<Order>()
        .await
        .into_iter()
        .filter(|o| query.status.is_none_or(|status| o.status == status))
        .collect();
    // Ids are creation timestamps.
    orders.sort_by_key(|o| std::cmp::Reverse(o.id.parse::<i64>().unwrap_or(0)));

    let (orders, meta) = query.pagination().apply(orders);
    Ok(ApiResponse::success("Orders", OrderList { orders }, Some(meta)))
}

/// Any status may follow any other; there is no enforced progression.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user, &state.config)?;

    let order = state
        .store
        .update_status(id, payload.status)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

    if !order.customer.email.is_empty() {
        notify::dispatch(state.notifier.clone(), notify::status_changed(&order));
    }

    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user, &state.config)?;

    if !state.store.remove::<Order>(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(order_id = %id, "order deleted");

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
