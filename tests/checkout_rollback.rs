mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use storefront::{
    dto::{auth::RegisterRequest, cart::AddToCartRequest, orders::CheckoutRequest},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        products::Entity as Products,
        users::Entity as Users,
    },
    error::AppError,
    middleware::{auth::AuthUser, session::SessionId},
    services::{auth_service, cart_service, order_service},
};
use uuid::Uuid;

// An item insert failing after the address update and order insert must
// undo both and keep the cart.
#[tokio::test]
async fn failed_item_insert_rolls_back_whole_checkout() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run the rollback flow.");
        return Ok(());
    };

    let state = common::db_state(&database_url).await?;
    let product_id = common::seed_product(&state, "7.25").await?;

    let registered = auth_service::register_user(
        &state,
        RegisterRequest {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            username: "grace".into(),
            password: "cobol59".into(),
            confirm_password: "cobol59".into(),
        },
    )
    .await?
    .data
    .expect("registered user");
    let user = AuthUser {
        user_id: registered.id,
        username: registered.username.clone(),
    };

    let session = SessionId(Uuid::new_v4());
    cart_service::add_to_cart(&state, session, AddToCartRequest { product_id }).await?;
    let cart_before = state.sessions.load_cart(session.0).await?;

    // The cart line now points at a product the order item cannot reference.
    Products::delete_by_id(product_id).exec(&state.orm).await?;

    let form = CheckoutRequest {
        first_name: Some("Grace".into()),
        last_name: Some("Hopper".into()),
        street: Some("1 Harvard Yard".into()),
        postal_code: Some("02138".into()),
        city: Some("Cambridge".into()),
        country: Some("US".into()),
    };
    let result = order_service::checkout(&state, &user, session, form).await;
    assert!(matches!(result, Err(AppError::OrmError(_))), "got {result:?}");

    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(orders, 0);

    let stored = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .expect("user row");
    assert_eq!(stored.address, None);

    assert_eq!(state.sessions.load_cart(session.0).await?, cart_before);
    Ok(())
}
