use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    cart::Cart,
    dto::orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        users::{ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::{auth::AuthUser, session::SessionId},
    models::{Order, OrderItem, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
    validation::{ShippingInfo, check_checkout_info},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemDraft {
    pub product_id: i32,
    pub qty: i32,
    pub price: Decimal,
}

/// What a cart turns into at checkout, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub total_price: Decimal,
    pub items: Vec<OrderItemDraft>,
}

/// Copies the cart subtotal and per-line price snapshots verbatim.
pub fn draft_order(cart: &Cart) -> OrderDraft {
    OrderDraft {
        total_price: cart.subtotal,
        items: cart
            .items
            .values()
            .map(|line| OrderItemDraft {
                product_id: line.product_id,
                qty: line.qty,
                price: line.unit_price,
            })
            .collect(),
    }
}

/// Writes the optional first address, the order and its items in one
/// transaction. Dropping the transaction on any error rolls everything back.
pub async fn persist_order(
    orm: &DatabaseConnection,
    user_id: i32,
    shipping: &ShippingInfo,
    draft: &OrderDraft,
) -> AppResult<(Order, Vec<OrderItem>)> {
    let txn = orm.begin().await?;

    let user = Users::find_by_id(user_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    // The first address sticks; later checkouts never overwrite it.
    if user.address.is_none() {
        let address = serde_json::to_value(&shipping.address)
            .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;
        let mut active: UserActive = user.into();
        active.address = Set(Some(address));
        active.update(&txn).await?;
    }

    let order = OrderActive {
        id: NotSet,
        uuid: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(Utc::now().into()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        total_price: Set(draft.total_price),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(draft.items.len());
    for line in &draft.items {
        let item = OrderItemActive {
            id: NotSet,
            uuid: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            qty: Set(line.qty),
            price: Set(line.price),
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(item));
    }

    txn.commit().await?;

    Ok((Order::from(order), items))
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    session: SessionId,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let cart = state.sessions.load_cart(session.0).await?;
    if cart.is_empty() {
        return Err(AppError::validation("Your cart is empty"));
    }

    let shipping = check_checkout_info(&payload)?;
    let draft = draft_order(&cart);

    let (order, items) = persist_order(&state.orm, user.user_id, &shipping, &draft).await?;

    if let Err(err) = state.sessions.save_cart(session.0, &Cart::init()).await {
        tracing::error!(error = %err, order_id = order.id, "failed to reset cart after checkout");
    }

    tracing::info!(
        order_id = order.id,
        user_id = user.user_id,
        username = %user.username,
        total_price = %order.total_price,
        items = items.len(),
        "order placed"
    );

    audit::record(
        &state.pool,
        Some(user.user_id),
        "checkout",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "uuid": order.uuid,
            "username": user.username,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse {
            order_id: order.id,
            uuid: order.uuid,
            total_price: order.total_price,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await?;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::page(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    uuid: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Uuid.eq(uuid)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use std::str::FromStr;

    fn line(product_id: i32, qty: i32, unit: &str) -> CartLine {
        let unit_price = Decimal::from_str(unit).unwrap();
        CartLine {
            product_id,
            name: format!("P{product_id}"),
            qty,
            unit_price,
            total_price: Decimal::from(qty) * unit_price,
            image_url: None,
        }
    }

    #[test]
    fn draft_copies_cart_snapshot() {
        let mut cart = Cart::init();
        cart.items.insert(1, line(1, 2, "9.99"));
        cart.items.insert(4, line(4, 1, "0.50"));
        cart.subtotal = Decimal::from_str("20.48").unwrap();
        cart.total_items = 3;

        let draft = draft_order(&cart);
        assert_eq!(draft.total_price.to_string(), "20.48");
        assert_eq!(
            draft.items,
            vec![
                OrderItemDraft {
                    product_id: 1,
                    qty: 2,
                    price: Decimal::from_str("9.99").unwrap(),
                },
                OrderItemDraft {
                    product_id: 4,
                    qty: 1,
                    price: Decimal::from_str("0.50").unwrap(),
                },
            ]
        );
    }

    #[test]
    fn draft_total_is_cart_subtotal_not_recomputed() {
        let mut cart = Cart::init();
        cart.items.insert(1, line(1, 1, "3.00"));
        // Deliberately out of step with the single 3.00 line.
        cart.subtotal = Decimal::from_str("5.00").unwrap();
        cart.total_items = 1;

        let draft = draft_order(&cart);
        assert_eq!(draft.total_price.to_string(), "5.00");
        assert_eq!(draft.items[0].price.to_string(), "3.00");
    }
}
