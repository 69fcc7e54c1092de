//! Checkout: turns a user's cart into a committed order.
//!
//! One checkout is a single transaction that locks the user row, then each
//! product row in ascending id order, validates balance and stock against
//! the locked values, and only then writes. Every caller locks in the same
//! order, so two checkouts can queue behind each other but never deadlock.
//!
//! A repeated submission within the duplicate window, with the same total,
//! returns the earlier order instead of charging again.

mod error;
mod postgres;
mod store;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument};

use golden_market_core::{Coins, OrderLineId, ProductId, UserId};

use crate::db::{LedgerError, RepositoryError};
use crate::models::{CartSummary, Order, OrderLine, Product};

pub use error::CheckoutError;
pub use postgres::{PgCheckoutStore, PgCheckoutTx};
pub use store::{CheckoutStore, CheckoutTx};

/// Tunables for [`CheckoutService`].
#[derive(Debug, Clone, Copy)]
pub struct CheckoutSettings {
    /// How far back a same-total order counts as a duplicate submission.
    pub duplicate_window: Duration,
    /// Upper bound on one checkout, including lock waits.
    pub timeout: Duration,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            duplicate_window: Duration::from_secs(15),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Quantity requested for one product, aggregated across cart lines.
#[derive(Debug)]
struct Wanted {
    quantity: i32,
    name: String,
}

/// A validated line, priced from the locked product row.
#[derive(Debug)]
struct PricedLine {
    product: Product,
    quantity: i32,
    subtotal: Coins,
}

/// The checkout orchestrator.
#[derive(Debug, Clone)]
pub struct CheckoutService<S> {
    store: S,
    settings: CheckoutSettings,
}

impl<S: CheckoutStore> CheckoutService<S> {
    #[must_use]
    pub const fn new(store: S, settings: CheckoutSettings) -> Self {
        Self { store, settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Check out the user's cart under the configured timeout.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]. On any error nothing has been written.
    pub async fn create_order(&self, user_id: UserId) -> Result<Order, CheckoutError> {
        self.create_order_within(user_id, self.settings.timeout)
            .await
    }

    /// Check out the user's cart, giving up after `deadline`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::DeadlineExceeded` if the deadline elapses
    /// first; the open transaction is dropped and rolls back.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn create_order_within(
        &self,
        user_id: UserId,
        deadline: Duration,
    ) -> Result<Order, CheckoutError> {
        tokio::time::timeout(deadline, self.checkout(user_id))
            .await
            .map_err(|_| CheckoutError::DeadlineExceeded)?
    }

    async fn checkout(&self, user_id: UserId) -> Result<Order, CheckoutError> {
        let window = self.settings.duplicate_window;

        let cart = self.store.cart_snapshot(user_id).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let recent = self.store.recent_orders(user_id, window).await?;
        if let Some(order) = find_duplicate(recent, cart.total_price) {
            info!(order_number = %order.order_number, "Duplicate checkout, returning existing order");
            return Ok(order);
        }

        let mut tx = self.store.begin().await?;

        let user = tx
            .lock_user(user_id)
            .await?
            .ok_or(CheckoutError::UserNotFound(user_id))?;

        // A submission that queued behind ours on the user lock sees our order here.
        let recent = tx.recent_orders(user_id, window).await?;
        if let Some(order) = find_duplicate(recent, cart.total_price) {
            info!(order_number = %order.order_number, "Duplicate checkout, returning existing order");
            return Ok(order);
        }

        if user.balance < cart.total_price {
            info!(balance = %user.balance, total = %cart.total_price, "Checkout rejected: insufficient coins");
            return Err(CheckoutError::InsufficientFunds {
                available: user.balance,
                required: cart.total_price,
            });
        }

        let mut lines = Vec::new();
        let mut total = Coins::ZERO;
        for (product_id, wanted) in aggregate(&cart)? {
            let line = lock_line(&mut tx, product_id, wanted).await?;
            total = total
                .checked_add(line.subtotal)
                .ok_or_else(|| overflow("order total"))?;
            lines.push(line);
        }

        if user.balance < total {
            info!(balance = %user.balance, total = %total, "Checkout rejected: insufficient coins");
            return Err(CheckoutError::InsufficientFunds {
                available: user.balance,
                required: total,
            });
        }

        let now = Utc::now();
        let mut order = Order::completed(user_id, total, now);

        tx.deduct_balance(user_id, total)
            .await
            .map_err(|err| match err {
                LedgerError::Insufficient => CheckoutError::InsufficientFunds {
                    available: user.balance,
                    required: total,
                },
                LedgerError::Repository(err) => CheckoutError::Storage(err),
            })?;

        tx.insert_order(&order).await?;

        for PricedLine {
            product,
            quantity,
            subtotal,
        } in lines
        {
            tx.decrement_stock(product.id, quantity)
                .await
                .map_err(|err| match err {
                    LedgerError::Insufficient => CheckoutError::InsufficientStock {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        available: product.stock,
                        requested: quantity,
                    },
                    LedgerError::Repository(err) => CheckoutError::Storage(err),
                })?;

            let line = OrderLine {
                id: OrderLineId::generate(),
                order_id: order.id,
                product_id: product.id,
                product_name: product.name,
                quantity,
                price_per_unit: product.price,
                subtotal,
                created_at: now,
            };
            tx.insert_order_line(&line).await?;
            tx.add_holding(user_id, product.id, quantity).await?;
            order.lines.push(line);
        }

        tx.clear_cart(user_id).await?;
        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            total = %order.total_amount,
            lines = order.lines.len(),
            "Order committed"
        );

        Ok(order)
    }
}

/// Lock one product and validate the wanted quantity against it.
async fn lock_line<T: CheckoutTx>(
    tx: &mut T,
    product_id: ProductId,
    wanted: Wanted,
) -> Result<PricedLine, CheckoutError> {
    let product = match tx.lock_product(product_id).await? {
        Some(product) if product.is_available => product,
        Some(product) => {
            return Err(CheckoutError::ProductUnavailable {
                product_id,
                product_name: product.name,
            });
        }
        None => {
            return Err(CheckoutError::ProductUnavailable {
                product_id,
                product_name: wanted.name,
            });
        }
    };

    if product.stock < wanted.quantity {
        info!(product_id = %product_id, stock = product.stock, requested = wanted.quantity, "Checkout rejected: insufficient stock");
        return Err(CheckoutError::InsufficientStock {
            product_id,
            product_name: product.name,
            available: product.stock,
            requested: wanted.quantity,
        });
    }

    let subtotal = product
        .price
        .checked_mul_quantity(wanted.quantity)
        .ok_or_else(|| overflow("line subtotal"))?;

    Ok(PricedLine {
        product,
        quantity: wanted.quantity,
        subtotal,
    })
}

/// Group cart lines by product; iteration order is the lock order.
fn aggregate(cart: &CartSummary) -> Result<BTreeMap<ProductId, Wanted>, CheckoutError> {
    let mut wanted: BTreeMap<ProductId, Wanted> = BTreeMap::new();

    for item in &cart.items {
        let entry = wanted.entry(item.product.id).or_insert_with(|| Wanted {
            quantity: 0,
            name: item.product.name.clone(),
        });
        entry.quantity = entry
            .quantity
            .checked_add(item.quantity)
            .ok_or_else(|| overflow("cart quantity"))?;
    }

    Ok(wanted)
}

/// The newest recent order whose stored total equals `total`, the cart
/// snapshot total.
///
/// Stored totals are priced from locked rows, so a retry after a price change
/// does not match the earlier order.
fn find_duplicate(recent: Vec<Order>, total: Coins) -> Option<Order> {
    recent.into_iter().find(|order| order.total_amount == total)
}

fn overflow(what: &str) -> CheckoutError {
    CheckoutError::Storage(RepositoryError::DataCorruption(format!("{what} overflows")))
}
