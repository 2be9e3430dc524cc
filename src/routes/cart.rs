use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch, post},
};

use crate::{
    dto::{
        auth::SessionResponse,
        cart::{AddToCartRequest, CartSummary, UpdateCartRequest},
    },
    error::AppResult,
    middleware::session::SessionId,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/add", post(add_to_cart))
        .route("/update", patch(update_cart))
}

#[utoipa::path(
    post,
    path = "/api/session",
    responses(
        (status = 200, description = "New session with an empty cart", body = ApiResponse<SessionResponse>)
    ),
    tag = "Cart"
)]
pub async fn start_session() -> Json<ApiResponse<SessionResponse>> {
    Json(cart_service::start_session())
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(("x-session-id" = String, Header, description = "Session id")),
    responses(
        (status = 200, description = "Current cart of the session", body = ApiResponse<CartSummary>),
        (status = 400, description = "Missing or invalid session id"),
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    session: SessionId,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let resp = cart_service::get_cart(&state, session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/add",
    params(("x-session-id" = String, Header, description = "Session id")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "One unit added", body = ApiResponse<CartSummary>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: SessionId,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let resp = cart_service::add_to_cart(&state, session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/update",
    params(("x-session-id" = String, Header, description = "Session id")),
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Cart after the action; unknown actions change nothing", body = ApiResponse<CartSummary>),
        (status = 404, description = "Product is not in the cart"),
    ),
    tag = "Cart"
)]
pub async fn update_cart(
    State(state): State<AppState>,
    session: SessionId,
    Json(payload): Json<UpdateCartRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let resp = cart_service::update_cart(&state, session, payload).await?;
    Ok(Json(resp))
}
