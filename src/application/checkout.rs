//! Purchase finalisation.
//!
//! Turns the current cart into an order, stores it on the user profile and
//! only then resets the session. A failure at any step before the profile
//! write completes leaves the cart and panel exactly as they were. Only the
//! ordered quantities leave the cart; anything added while the profile
//! write was in flight stays for the next purchase.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::application::session::CartSession;
use crate::domain::aggregates::{Order, PurchaseHistory};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::MoneyError;
use crate::ports::{publish_all, EventPublisher, RepositoryError, UserRepository};

pub const DEFAULT_CONFIRMATION_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Could not load user {user_id}: {source}")]
    UserLookup { user_id: String, #[source] source: RepositoryError },

    #[error("Could not save purchase for user {user_id}: {source}")]
    Persistence { user_id: String, #[source] source: RepositoryError },

    #[error("A checkout is already running for this cart")]
    InProgress,

    #[error("Could not price the cart: {0}")]
    Pricing(#[from] MoneyError),
}

impl CheckoutError {
    /// Whether repeating the checkout unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UserLookup { source, .. } | Self::Persistence { source, .. } => {
                !matches!(source, RepositoryError::UserNotFound(_) | RepositoryError::Serialization(_))
            }
            Self::InProgress => true,
            Self::Pricing(_) => false,
        }
    }
}

pub struct CheckoutService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventPublisher>,
    policy: PurchaseHistory,
    confirmation_delay: Duration,
}

impl CheckoutService {
    pub fn new(users: Arc<dyn UserRepository>, events: Arc<dyn EventPublisher>) -> Self {
        Self { users, events, policy: PurchaseHistory::default(), confirmation_delay: DEFAULT_CONFIRMATION_DELAY }
    }

    pub fn with_policy(mut self, policy: PurchaseHistory) -> Self { self.policy = policy; self }
    pub fn with_confirmation_delay(mut self, delay: Duration) -> Self { self.confirmation_delay = delay; self }
    pub fn policy(&self) -> PurchaseHistory { self.policy }

    /// Finalises the purchase for `user_id` from the session's cart.
    ///
    /// The cart is not re-checked for emptiness; an empty cart yields an
    /// order with no lines and a zero total. A second checkout on the same
    /// session while this one runs fails with [`CheckoutError::InProgress`].
    #[instrument(skip(self, session))]
    pub async fn finish_purchase(&self, user_id: &str, session: &CartSession) -> Result<Order, CheckoutError> {
        let Some(_checkout) = session.try_begin_checkout() else {
            info!(user_id, "Checkout already running for this session");
            return Err(CheckoutError::InProgress);
        };
        let cart = session.store().snapshot();
        let order = Order::from_items(cart.items(), cart.currency(), Utc::now()).map_err(|e| {
            error!(error = %e, user_id, "Error processing purchase: cart could not be priced");
            CheckoutError::Pricing(e)
        })?;

        let user = self.users.get_user(user_id).await.map_err(|source| {
            error!(error = %source, user_id, "Error processing purchase: user lookup failed");
            CheckoutError::UserLookup { user_id: user_id.to_string(), source }
        })?;

        let updated = user.with_purchase(order.clone(), self.policy);
        if let Err(source) = self.users.update_user(&updated).await {
            error!(error = %source, user_id, order_id = order.id(), "Error processing purchase: profile update failed");
            return Err(CheckoutError::Persistence { user_id: user_id.to_string(), source });
        }

        session.show_confirmation();
        let mut events = session.store().remove_ordered(order.products());
        session.schedule_reset(self.confirmation_delay);

        info!(user_id, order_id = order.id(), total = %order.total(), lines = order.products().len(), "Purchase completed");
        events.push(DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id().to_string(),
            user_id: user_id.to_string(),
            total: order.total().amount(),
            lines: order.products().len(),
        }));
        publish_all(self.events.as_ref(), events).await;

        Ok(order)
    }
}
