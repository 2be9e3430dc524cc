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
    cart::{Cart, CartLine},
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, SessionResponse},
        cart::{AddToCartRequest, CartAction, CartSummary, UpdateCartRequest},
        orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems},
        products::{CategoryList, ProductList},
    },
    models::{Address, Category, Order, OrderItem, Product, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, health, orders, params, products},
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
        auth::register,
        auth::login,
        auth::logout_session,
        cart::start_session,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart,
        products::list_products,
        products::get_product,
        products::list_categories,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
    ),
    components(
        schemas(
            User,
            Address,
            Product,
            Category,
            Order,
            OrderItem,
            Cart,
            CartLine,
            CartAction,
            CartSummary,
            AddToCartRequest,
            UpdateCartRequest,
            CheckoutRequest,
            CheckoutResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            SessionResponse,
            OrderList,
            OrderWithItems,
            ProductList,
            CategoryList,
            params::SortOrder,
            Meta,
            ApiResponse<CartSummary>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<ProductList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and logout"),
        (name = "Cart", description = "Session cart"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Products", description = "Catalog"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
