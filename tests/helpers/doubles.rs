use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

use storefront::core::{AppError, BusinessClock, Result};
use storefront::notifications::{EmailMessage, Notifier};
use storefront::orders::models::Order;
use storefront::orders::{InMemoryOrderRepository, OrderFilter, OrderRepository};
use storefront::payments::{ChargeReceipt, ChargeRequest, PaymentProvider};

/// Payment provider whose answers are set up by the test.
///
/// Charges succeed unless the order is on the decline list or the next
/// scripted answer is `false`. Every request is recorded.
#[derive(Default)]
pub struct ScriptedProvider {
    declined_orders: Mutex<HashSet<String>>,
    script: Mutex<VecDeque<bool>>,
    requests: Mutex<Vec<ChargeRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decline_order(&self, order_id: &str) {
        self.declined_orders.lock().insert(order_id.to_string());
    }

    pub fn accept_order(&self, order_id: &str) {
        self.declined_orders.lock().remove(order_id);
    }

    /// Queue answers for the next charges, in order
    pub fn script(&self, answers: impl IntoIterator<Item = bool>) {
        self.script.lock().extend(answers);
    }

    pub fn requests(&self) -> Vec<ChargeRequest> {
        self.requests.lock().clone()
    }

    pub fn charges_for(&self, order_id: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.order_id == order_id)
            .count()
    }
}

#[async_trait]
impl PaymentProvider for ScriptedProvider {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt> {
        self.requests.lock().push(request.clone());

        let declined = self.declined_orders.lock().contains(&request.order_id);
        let scripted = self.script.lock().pop_front().unwrap_or(true);

        if declined || !scripted {
            return Err(AppError::payment("card declined"));
        }

        Ok(ChargeReceipt {
            external_ref: format!("txn_{}", request.idempotency_key),
            charged_at: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Notifier that keeps every message; optionally fails every send
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent.lock().iter().map(|m| m.subject.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.fail {
            return Err(AppError::Notification("relay unavailable".to_string()));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// In-memory ledger whose `save` fails for selected orders
pub struct FlakyRepository {
    inner: InMemoryOrderRepository,
    failing_saves: Mutex<HashSet<String>>,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryOrderRepository::new(),
            failing_saves: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_saves_for(&self, order_id: &str) {
        self.failing_saves.lock().insert(order_id.to_string());
    }
}

#[async_trait]
impl OrderRepository for FlakyRepository {
    async fn insert(&self, order: Order) -> Result<Order> {
        self.inner.insert(order).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>> {
        self.inner.find_by_id(id).await
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        self.inner.find(filter).await
    }

    async fn save(&self, order: Order) -> Result<Order> {
        if self.failing_saves.lock().contains(&order.id) {
            return Err(AppError::internal("write rejected by storage"));
        }
        self.inner.save(order).await
    }

    async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        self.inner.count_created_between(start, end).await
    }

    async fn reserve_order_sequence(&self, day: NaiveDate) -> Result<u32> {
        self.inner.reserve_order_sequence(day).await
    }
}

/// In-memory ledger where another writer commits to a chosen order between
/// the caller's read and its next `save`, once per arming
pub struct InterleavedWriteRepository {
    inner: InMemoryOrderRepository,
    armed: Mutex<HashSet<String>>,
}

impl InterleavedWriteRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryOrderRepository::new(),
            armed: Mutex::new(HashSet::new()),
        }
    }

    pub fn interleave_write_on(&self, order_id: &str) {
        self.armed.lock().insert(order_id.to_string());
    }
}

#[async_trait]
impl OrderRepository for InterleavedWriteRepository {
    async fn insert(&self, order: Order) -> Result<Order> {
        self.inner.insert(order).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>> {
        self.inner.find_by_id(id).await
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        self.inner.find(filter).await
    }

    async fn save(&self, order: Order) -> Result<Order> {
        let interleave = self.armed.lock().remove(&order.id);
        if interleave {
            if let Some(mut current) = self.inner.find_by_id(&order.id).await? {
                current.shipping_address = format!("{} (updated)", current.shipping_address);
                self.inner.save(current).await?;
            }
        }
        self.inner.save(order).await
    }

    async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        self.inner.count_created_between(start, end).await
    }

    async fn reserve_order_sequence(&self, day: NaiveDate) -> Result<u32> {
        self.inner.reserve_order_sequence(day).await
    }
}

/// UTC business clock, so `at(..)` instants and calendar days line up
pub fn utc_clock() -> BusinessClock {
    BusinessClock::utc()
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
