use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CartLine, SavedCard, User, WishlistLine};

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserProfile,
}

/// Fields a user may change on their own record. Anything else in the body is
/// ignored.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub saved_cards: Option<Vec<SavedCard>>,
    pub cart: Option<Vec<CartLine>>,
    pub wishlist: Option<Vec<WishlistLine>>,
}

impl UpdateProfileRequest {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = self.address {
            user.address = Some(address);
        }
        if let Some(city) = self.city {
            user.city = Some(city);
        }
        if let Some(country) = self.country {
            user.country = Some(country);
        }
        if let Some(saved_cards) = self.saved_cards {
            user.saved_cards = saved_cards;
        }
        if let Some(mut cart) = self.cart {
            // Client totals are not trusted.
            for line in &mut cart {
                line.set_quantity(line.quantity);
            }
            user.cart = cart;
        }
        if let Some(wishlist) = self.wishlist {
            user.wishlist = wishlist;
        }
    }
}

/// A user as returned to clients: no password hash, admin flag derived.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub cart: Vec<CartLine>,
    pub wishlist: Vec<WishlistLine>,
    pub saved_cards: Vec<SavedCard>,
    pub is_admin: bool,
}

impl UserProfile {
    pub fn new(user: User, is_admin: bool) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            city: user.city,
            country: user.country,
            cart: user.cart,
            wishlist: user.wishlist,
            saved_cards: user.saved_cards,
            is_admin,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}
