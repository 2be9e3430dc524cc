mod common;

use storefront::{
    dto::orders::CheckoutRequest,
    error::AppError,
    middleware::{auth::AuthUser, session::SessionId},
    services::order_service,
};
use uuid::Uuid;

fn user() -> AuthUser {
    AuthUser {
        user_id: 1,
        username: "ada".into(),
    }
}

fn valid_form() -> CheckoutRequest {
    CheckoutRequest {
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
        street: Some("12 Analytical Way".into()),
        postal_code: Some("NW1".into()),
        city: Some("London".into()),
        country: Some("UK".into()),
    }
}

#[tokio::test]
async fn empty_cart_is_rejected_before_persistence() -> anyhow::Result<()> {
    let state = common::offline_state()?;
    let session = SessionId(Uuid::new_v4());

    let err = order_service::checkout(&state, &user(), session, valid_form())
        .await
        .expect_err("empty cart must not check out");

    match err {
        AppError::Validation(messages) => assert_eq!(messages, vec!["Your cart is empty"]),
        other => panic!("expected validation error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_all_reported_and_cart_is_kept() -> anyhow::Result<()> {
    let state = common::offline_state()?;
    let session = SessionId(Uuid::new_v4());
    let cart = common::cart_with(&[common::product(1, "9.99")]);
    state.sessions.save_cart(session.0, &cart).await?;

    let form = CheckoutRequest {
        first_name: Some("Ada".into()),
        postal_code: Some("".into()),
        ..Default::default()
    };
    let err = order_service::checkout(&state, &user(), session, form)
        .await
        .expect_err("incomplete form must fail");

    match err {
        AppError::Validation(messages) => assert_eq!(
            messages,
            vec![
                "last_name is required",
                "street is required",
                "postal_code is required",
                "city is required",
                "country is required",
            ]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(state.sessions.load_cart(session.0).await?, cart);
    Ok(())
}

#[tokio::test]
async fn persistence_failure_leaves_cart_untouched() -> anyhow::Result<()> {
    let state = common::offline_state()?;
    let session = SessionId(Uuid::new_v4());
    let p = common::product(1, "9.99");
    let cart = common::cart_with(&[p.clone(), p]);
    state.sessions.save_cart(session.0, &cart).await?;

    let err = order_service::checkout(&state, &user(), session, valid_form())
        .await
        .expect_err("offline database must fail the checkout");

    assert!(matches!(err, AppError::OrmError(_)), "got {err:?}");
    let stored = state.sessions.load_cart(session.0).await?;
    assert_eq!(stored, cart);
    assert_eq!(stored.subtotal.to_string(), "19.98");
    Ok(())
}
