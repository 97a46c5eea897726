use storefront_api::{
    config::AppConfig,
    models::{Product, User, format_price},
    services::auth_service::hash_password,
    store::JsonStore,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let store = JsonStore::open(&config.data_dir);

    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let admin_id = ensure_user(&store, "Store Admin", &config.admin_email, &admin_password).await?;
    let user_id = ensure_user(&store, "Demo Customer", "user@example.com", "user123").await?;
    seed_products(&store).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    store: &JsonStore,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<String> {
    if let Some(existing) = store
        .list::<User>()
        .await
        .into_iter()
        .find(|u| u.email == email)
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = store
        .insert(User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: Some(password_hash),
            ..Default::default()
        })
        .await?;

    println!("Created user {email}");
    Ok(user.id)
}

async fn seed_products(store: &JsonStore) -> anyhow::Result<()> {
    if !store.list::<Product>().await.is_empty() {
        println!("Products already seeded");
        return Ok(());
    }

    let products = [
        ("Canvas Tote Bag", 18.0, None, Some("New")),
        ("Ceramic Coffee Mug", 12.5, Some(15.0), Some("Sale")),
        ("Linen Throw Pillow", 34.0, None, None),
        ("Scented Soy Candle", 22.0, Some(28.0), Some("Sale")),
        ("Walnut Desk Organizer", 46.0, None, None),
    ];

    for (title, price, old_price, badge) in products {
        store
            .insert(Product {
                id: 0,
                title: title.to_string(),
                price: format_price(price),
                old_price: old_price.map(format_price),
                image: String::new(),
                badge: badge.map(str::to_string),
            })
            .await?;
    }

    println!("Seeded products");
    Ok(())
}
