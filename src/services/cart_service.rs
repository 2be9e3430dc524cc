use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    cart::{Cart, CartLine, money},
    dto::{
        auth::SessionResponse,
        cart::{AddToCartRequest, CartAction, CartSummary, UpdateCartRequest},
    },
    error::{AppError, AppResult},
    middleware::session::SessionId,
    models::Product,
    response::ApiResponse,
    services::product_service,
    state::AppState,
};

/// Adds one unit of `product`, snapshotting its price on first add.
pub fn add(cart: &Cart, product: &Product) -> Cart {
    let mut next = cart.clone();
    let line = next.items.entry(product.id).or_insert_with(|| CartLine {
        product_id: product.id,
        name: product.name.clone(),
        qty: 0,
        unit_price: money(product.price),
        total_price: money(Decimal::ZERO),
        image_url: product.image_url.clone(),
    });
    line.qty += 1;
    line.recompute_total();
    next.subtotal += line.unit_price;
    next.total_items += 1;
    next
}

pub fn increase(cart: &Cart, product_id: i32) -> AppResult<Cart> {
    if !cart.items.contains_key(&product_id) {
        return Err(AppError::NotFound);
    }
    let mut next = cart.clone();
    if let Some(line) = next.items.get_mut(&product_id) {
        line.qty += 1;
        line.recompute_total();
        next.subtotal += line.unit_price;
        next.total_items += 1;
    }
    Ok(next)
}

/// Removes one unit; the line disappears when its last unit goes.
pub fn decrease(cart: &Cart, product_id: i32) -> AppResult<Cart> {
    let Some(current) = cart.items.get(&product_id) else {
        return Err(AppError::NotFound);
    };
    let mut next = cart.clone();
    next.subtotal -= current.unit_price;
    next.total_items -= 1;
    if current.qty == 1 {
        next.items.remove(&product_id);
    } else if let Some(line) = next.items.get_mut(&product_id) {
        line.qty -= 1;
        line.recompute_total();
    }
    Ok(next)
}

/// Applies `action`; `Unknown` leaves the cart as it is.
pub fn apply(cart: &Cart, product_id: i32, action: CartAction) -> AppResult<Cart> {
    match action {
        CartAction::Increase => increase(cart, product_id),
        CartAction::Decrease => decrease(cart, product_id),
        CartAction::Unknown => Ok(cart.clone()),
    }
}

fn summary(session: SessionId, cart: Cart) -> CartSummary {
    CartSummary {
        session_id: session.0,
        cart,
    }
}

/// Issues a fresh session id. Nothing is stored until the first cart write.
pub fn start_session() -> ApiResponse<SessionResponse> {
    let session_id = Uuid::new_v4();
    tracing::debug!(%session_id, "session started");
    ApiResponse::success("Session started", SessionResponse { session_id }, None)
}

pub async fn get_cart(state: &AppState, session: SessionId) -> AppResult<ApiResponse<CartSummary>> {
    let cart = state.sessions.load_cart(session.0).await?;
    Ok(ApiResponse::ok(summary(session, cart)))
}

pub async fn add_to_cart(
    state: &AppState,
    session: SessionId,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartSummary>> {
    let product = product_service::find_product(state, payload.product_id).await?;
    let cart = state.sessions.load_cart(session.0).await?;

    let cart = add(&cart, &product);
    state.sessions.save_cart(session.0, &cart).await?;

    tracing::debug!(
        session_id = %session.0,
        product_id = product.id,
        total_items = cart.total_items,
        subtotal = %cart.subtotal,
        "added to cart"
    );
    Ok(ApiResponse::success("Added to cart", summary(session, cart), None))
}

pub async fn update_cart(
    state: &AppState,
    session: SessionId,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartSummary>> {
    let cart = state.sessions.load_cart(session.0).await?;

    if payload.action == CartAction::Unknown {
        return Ok(ApiResponse::success("Cart unchanged", summary(session, cart), None));
    }

    let product_id = payload
        .product_id
        .ok_or_else(|| AppError::validation("product_id is required"))?;
    let cart = apply(&cart, product_id, payload.action)?;
    state.sessions.save_cart(session.0, &cart).await?;

    tracing::debug!(
        session_id = %session.0,
        product_id,
        action = ?payload.action,
        total_items = cart.total_items,
        subtotal = %cart.subtotal,
        "cart updated"
    );
    Ok(ApiResponse::success("Cart updated", summary(session, cart), None))
}
