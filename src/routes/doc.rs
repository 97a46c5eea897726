use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, MeResponse, SignupRequest, UpdateProfileRequest, UserProfile},
        orders::{OrderList, PlaceOrderRequest, PlaceOrderResponse, UpdateOrderStatusRequest},
        products::{CreateProductRequest, PriceInput, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
        stats::{
            AccountSummary, AdminStats, ProductSentiment, RatingCount, RecentOrder, RevenuePoint,
            ReviewedProduct, TopProduct,
        },
        users::UserList,
    },
    models::{
        CartLine, CustomerInfo, Order, OrderLine, OrderStatus, Product, Review, SavedCard,
        WishlistLine,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, health, orders, params, products, reviews},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::signup,
        auth::login,
        auth::logout,
        auth::me,
        auth::update_me,
        orders::list_orders,
        orders::place_order,
        products::list_products,
        products::get_product,
        reviews::list_reviews,
        reviews::create_review,
        reviews::get_review,
        reviews::update_review,
        reviews::delete_review,
        admin::stats,
        admin::list_all_orders,
        admin::update_order_status,
        admin::delete_order,
        admin::list_users,
        admin::delete_user,
        admin::create_product,
        admin::update_product,
        admin::delete_product
    ),
    components(
        schemas(
            CartLine,
            WishlistLine,
            SavedCard,
            CustomerInfo,
            Order,
            OrderLine,
            OrderStatus,
            Product,
            Review,
            UserProfile,
            SignupRequest,
            LoginRequest,
            LoginResponse,
            MeResponse,
            UpdateProfileRequest,
            PlaceOrderRequest,
            PlaceOrderResponse,
            UpdateOrderStatusRequest,
            OrderList,
            PriceInput,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewList,
            AdminStats,
            RevenuePoint,
            TopProduct,
            RecentOrder,
            AccountSummary,
            RatingCount,
            ReviewedProduct,
            ProductSentiment,
            UserList,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::ReviewQuery,
            params::StatsQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderList>,
            ApiResponse<AdminStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Signup, login and the current user's profile, cart and wishlist"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Products", description = "Product catalog"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Admin", description = "Admin dashboard endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
