//! Session-keyed cart persistence.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    cart::Cart,
    entity::sessions::{ActiveModel as SessionActive, Column as SessionCol, Entity as Sessions},
    error::{AppError, AppResult},
};

/// Idle lifetime used when none is configured: two weeks.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;

/// Reads and writes the cart of one session as a whole unit.
///
/// A session expires once its cart has not been written for the store's
/// TTL; an expired session reads as an empty cart until it is purged.
/// There is no per-session locking: two concurrent writers for the same
/// session resolve as last-write-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored cart, or an empty one when the session has none
    /// yet or has expired.
    async fn load_cart(&self, session_id: Uuid) -> AppResult<Cart>;

    async fn save_cart(&self, session_id: Uuid, cart: &Cart) -> AppResult<()>;

    async fn clear(&self, session_id: Uuid) -> AppResult<()>;

    /// Deletes sessions last written before `cutoff`, returning how many.
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;

    fn ttl(&self) -> Duration;

    async fn purge_expired(&self) -> AppResult<u64> {
        self.purge_older_than(Utc::now() - self.ttl()).await
    }
}

pub type SharedSessionStore = Arc<dyn SessionStore>;

fn default_ttl() -> Duration {
    Duration::seconds(DEFAULT_SESSION_TTL_SECS)
}

#[derive(Debug, Clone)]
struct StoredCart {
    cart: Cart,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct MemorySessionStore {
    carts: RwLock<HashMap<Uuid, StoredCart>>,
    ttl: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_ttl(default_ttl())
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            carts: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load_cart(&self, session_id: Uuid) -> AppResult<Cart> {
        let cutoff = Utc::now() - self.ttl;
        let carts = self.carts.read().await;
        Ok(carts
            .get(&session_id)
            .filter(|stored| stored.updated_at >= cutoff)
            .map(|stored| stored.cart.clone())
            .unwrap_or_else(Cart::init))
    }

    async fn save_cart(&self, session_id: Uuid, cart: &Cart) -> AppResult<()> {
        let stored = StoredCart {
            cart: cart.clone(),
            updated_at: Utc::now(),
        };
        self.carts.write().await.insert(session_id, stored);
        Ok(())
    }

    async fn clear(&self, session_id: Uuid) -> AppResult<()> {
        self.carts.write().await.remove(&session_id);
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut carts = self.carts.write().await;
        let before = carts.len();
        carts.retain(|_, stored| stored.updated_at >= cutoff);
        Ok((before - carts.len()) as u64)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Stores carts as `jsonb` in the `sessions` table.
#[derive(Debug, Clone)]
pub struct DbSessionStore {
    orm: DatabaseConnection,
    ttl: Duration,
}

impl DbSessionStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self::with_ttl(orm, default_ttl())
    }

    pub fn with_ttl(orm: DatabaseConnection, ttl: Duration) -> Self {
        Self { orm, ttl }
    }
}

#[async_trait]
impl SessionStore for DbSessionStore {
    async fn load_cart(&self, session_id: Uuid) -> AppResult<Cart> {
        let cutoff = Utc::now() - self.ttl;
        let row = Sessions::find_by_id(session_id)
            .filter(SessionCol::UpdatedAt.gte(cutoff))
            .one(&self.orm)
            .await?;
        match row {
            Some(row) => Cart::from_json(row.cart).map_err(|err| {
                AppError::Internal(anyhow::anyhow!("corrupt cart in session {session_id}: {err}"))
            }),
            None => Ok(Cart::init()),
        }
    }

    async fn save_cart(&self, session_id: Uuid, cart: &Cart) -> AppResult<()> {
        let payload = cart
            .to_json()
            .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;
        let active = SessionActive {
            id: Set(session_id),
            cart: Set(payload),
            updated_at: Set(Utc::now().into()),
        };
        Sessions::insert(active)
            .on_conflict(
                OnConflict::column(SessionCol::Id)
                    .update_columns([SessionCol::Cart, SessionCol::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.orm)
            .await?;
        Ok(())
    }

    async fn clear(&self, session_id: Uuid) -> AppResult<()> {
        Sessions::delete_by_id(session_id).exec(&self.orm).await?;
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = Sessions::delete_many()
            .filter(SessionCol::UpdatedAt.lt(cutoff))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use rust_decimal::Decimal;

    fn one_line_cart() -> Cart {
        let mut cart = Cart::init();
        cart.items.insert(
            1,
            CartLine {
                product_id: 1,
                name: "Tea".into(),
                qty: 1,
                unit_price: Decimal::new(450, 2),
                total_price: Decimal::new(450, 2),
                image_url: None,
            },
        );
        cart.subtotal = Decimal::new(450, 2);
        cart.total_items = 1;
        cart
    }

    #[tokio::test]
    async fn unknown_session_loads_empty_cart() {
        let store = MemorySessionStore::new();
        let cart = store.load_cart(Uuid::new_v4()).await.unwrap();
        assert_eq!(cart, Cart::init());
    }

    #[tokio::test]
    async fn carts_are_isolated_per_session() {
        let store = MemorySessionStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.save_cart(a, &one_line_cart()).await.unwrap();

        assert_eq!(store.load_cart(a).await.unwrap().total_items, 1);
        assert!(store.load_cart(b).await.unwrap().is_empty());

        store.clear(a).await.unwrap();
        assert!(store.load_cart(a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_session_loads_empty_cart() {
        let store = MemorySessionStore::with_ttl(Duration::milliseconds(1));
        let session = Uuid::new_v4();
        store.save_cart(session, &one_line_cart()).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(store.load_cart(session).await.unwrap(), Cart::init());
    }

    #[tokio::test]
    async fn purge_removes_only_idle_sessions() {
        let store = MemorySessionStore::new();
        let stale = Uuid::new_v4();
        store.save_cart(stale, &one_line_cart()).await.unwrap();
        let cutoff = Utc::now() + Duration::milliseconds(1);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let fresh = Uuid::new_v4();
        store.save_cart(fresh, &one_line_cart()).await.unwrap();

        assert_eq!(store.purge_older_than(cutoff).await.unwrap(), 1);
        assert!(store.load_cart(stale).await.unwrap().is_empty());
        assert_eq!(store.load_cart(fresh).await.unwrap().total_items, 1);
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }
}
