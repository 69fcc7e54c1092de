//! Cart service: pending selections before checkout.
//!
//! Stock and availability are checked when a line is added or changed, but
//! nothing is reserved; checkout re-validates against locked rows.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use golden_market_core::{CartLineId, ProductId, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::CartSummary;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(i32),

    #[error("product not found")]
    ProductNotFound,

    #[error("{0} is not available")]
    ProductUnavailable(String),

    #[error("insufficient stock for {product_name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_name: String,
        available: i32,
        requested: i32,
    },

    #[error("cart item not found")]
    LineNotFound,

    #[error("user not found")]
    UnknownUser,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Cart operations for one request.
pub struct CartService<'a> {
    pool: &'a PgPool,
    carts: CartRepository,
    products: ProductRepository,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            carts: CartRepository,
            products: ProductRepository,
        }
    }

    /// Current cart with prices resolved from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartSummary, CartError> {
        let mut conn = self.pool.acquire().await.map_err(RepositoryError::from)?;
        Ok(self.carts.snapshot(&mut conn, user_id).await?)
    }

    /// Add a product, merging with an existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a non-positive quantity,
    /// `CartError::ProductNotFound`, `CartError::ProductUnavailable`, or
    /// `CartError::InsufficientStock` when the merged quantity exceeds stock.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartSummary, CartError> {
        validate_quantity(quantity)?;

        let mut conn = self.pool.acquire().await.map_err(RepositoryError::from)?;

        let product = self
            .products
            .get_by_id(&mut conn, product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        if !product.is_available {
            return Err(CartError::ProductUnavailable(product.name));
        }

        let cart = self.carts.snapshot(&mut conn, user_id).await?;
        let in_cart = cart
            .items
            .iter()
            .find(|item| item.product.id == product_id)
            .map_or(0, |item| item.quantity);
        let requested = in_cart.saturating_add(quantity);
        check_stock(&product.name, product.stock, requested)?;

        self.carts
            .add(&mut conn, user_id, product_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::InvalidReference => CartError::UnknownUser,
                other => CartError::Repository(other),
            })?;

        Ok(self.carts.snapshot(&mut conn, user_id).await?)
    }

    /// Replace the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line is not in this user's
    /// cart, `CartError::InsufficientStock` if stock cannot cover it.
    #[instrument(skip(self), fields(user_id = %user_id, line_id = %line_id))]
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        line_id: CartLineId,
        quantity: i32,
    ) -> Result<CartSummary, CartError> {
        validate_quantity(quantity)?;

        let mut conn = self.pool.acquire().await.map_err(RepositoryError::from)?;

        let cart = self.carts.snapshot(&mut conn, user_id).await?;
        let item = cart
            .items
            .iter()
            .find(|item| item.line_id == line_id)
            .ok_or(CartError::LineNotFound)?;
        check_stock(&item.product.name, item.product.stock, quantity)?;

        self.carts
            .update_quantity(&mut conn, user_id, line_id, quantity)
            .await
            .map_err(not_found_as_line)?;

        Ok(self.carts.snapshot(&mut conn, user_id).await?)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line is not in this user's cart.
    #[instrument(skip(self), fields(user_id = %user_id, line_id = %line_id))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        line_id: CartLineId,
    ) -> Result<CartSummary, CartError> {
        let mut conn = self.pool.acquire().await.map_err(RepositoryError::from)?;

        self.carts
            .remove(&mut conn, user_id, line_id)
            .await
            .map_err(not_found_as_line)?;

        Ok(self.carts.snapshot(&mut conn, user_id).await?)
    }
}

fn not_found_as_line(err: RepositoryError) -> CartError {
    match err {
        RepositoryError::NotFound => CartError::LineNotFound,
        other => CartError::Repository(other),
    }
}

const fn validate_quantity(quantity: i32) -> Result<(), CartError> {
    if quantity <= 0 {
        return Err(CartError::InvalidQuantity(quantity));
    }
    Ok(())
}

fn check_stock(product_name: &str, available: i32, requested: i32) -> Result<(), CartError> {
    if available < requested {
        return Err(CartError::InsufficientStock {
            product_name: product_name.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}
