//! The exchange facade
//!
//! Owns the registry, the wallet ledger, the order and trade stores, and
//! one `PairEngine` per trading pair behind a pair-scoped mutex. The
//! mutex is held from admission through matching, which is the
//! serialization boundary the matching algorithm requires; a
//! cancellation arriving mid-match simply queues behind the in-flight
//! submission and then observes the order's true state.

use chrono::Utc;
use dashmap::DashMap;
use matching_engine::book::BookSnapshot;
use matching_engine::{EngineConfig, OrderFilter, OrderStore, PairEngine, PairRegistry, SubmitRequest};
use rust_decimal::Decimal;
use settlement::SettlementCoordinator;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use types::errors::{EngineError, LedgerError, OrderError};
use types::events::ExchangeEvent;
use types::ids::{AccountId, MarketId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};
use types::trade::Trade;
use wallet_ledger::{Wallet, WalletLedger};

use crate::events::EventBus;

/// Query filter for trade lookups: by pair, by account, or both
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub symbol: Option<MarketId>,
    pub account_id: Option<AccountId>,
    /// Most-recent-first cap on the result size
    pub limit: Option<usize>,
}

/// The order matching and settlement core, one instance per deployment
pub struct Exchange {
    registry: Arc<PairRegistry>,
    ledger: Arc<WalletLedger>,
    settler: Arc<SettlementCoordinator>,
    store: Arc<OrderStore>,
    engines: DashMap<String, Arc<Mutex<PairEngine>>>,
    trades: Mutex<Vec<Trade>>,
    events: EventBus,
    config: EngineConfig,
}

impl Exchange {
    /// Create an exchange and the event receiver for the notification sink
    pub fn new(config: EngineConfig) -> (Self, UnboundedReceiver<ExchangeEvent>) {
        let (events, rx) = EventBus::channel();
        let ledger = Arc::new(WalletLedger::new());
        let exchange = Self {
            registry: Arc::new(PairRegistry::new()),
            settler: Arc::new(SettlementCoordinator::new(Arc::clone(&ledger))),
            ledger,
            store: Arc::new(OrderStore::new()),
            engines: DashMap::new(),
            trades: Mutex::new(Vec::new()),
            events,
            config,
        };
        (exchange, rx)
    }

    /// The trading pair registry (admin surface)
    pub fn registry(&self) -> &PairRegistry {
        &self.registry
    }

    /// The wallet ledger
    pub fn ledger(&self) -> &WalletLedger {
        &self.ledger
    }

    fn now_nanos() -> i64 {
        Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }

    fn engine_for(&self, symbol: &MarketId) -> Arc<Mutex<PairEngine>> {
        let entry = self
            .engines
            .entry(symbol.as_str().to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(PairEngine::new(
                    symbol.clone(),
                    Arc::clone(&self.ledger),
                    Arc::clone(&self.settler),
                    Arc::clone(&self.store),
                    self.config.clone(),
                )))
            });
        Arc::clone(entry.value())
    }

    /// Submit an order
    ///
    /// `limit_price` is required for limit orders; for market orders it
    /// is the optional worst-acceptable price cap.
    pub fn submit_order(
        &self,
        account_id: AccountId,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        amount: Quantity,
        limit_price: Option<Price>,
    ) -> Result<Order, EngineError> {
        let pair = self.registry.get(symbol)?;
        let engine = self.engine_for(&pair.symbol);
        let timestamp = Self::now_nanos();

        let outcome = {
            let mut engine = engine.lock().expect("pair engine mutex poisoned");
            engine.submit(
                SubmitRequest {
                    account_id,
                    side,
                    order_type,
                    amount,
                    limit_price,
                },
                &pair,
                timestamp,
            )?
        };

        if !outcome.trades.is_empty() {
            let mut trades = self.trades.lock().expect("trade store mutex poisoned");
            trades.extend(outcome.trades.iter().cloned());
        }
        self.events.publish_all(outcome.events);
        Ok(outcome.order)
    }

    /// Cancel an order the caller owns
    pub fn cancel_order(
        &self,
        order_id: OrderId,
        account_id: AccountId,
    ) -> Result<Order, EngineError> {
        let order = self.store.get(&order_id).ok_or(OrderError::NotFound {
            order_id: order_id.to_string(),
        })?;
        let engine = self.engine_for(&order.symbol);
        let timestamp = Self::now_nanos();

        let (cancelled, events) = {
            let mut engine = engine.lock().expect("pair engine mutex poisoned");
            engine.cancel(order_id, account_id, timestamp)?
        };

        self.events.publish_all(events);
        Ok(cancelled)
    }

    /// Depth snapshot of one pair's book
    pub fn order_book(&self, symbol: &str, depth: usize) -> Result<BookSnapshot, EngineError> {
        let pair = self.registry.get(symbol)?;
        let engine = self.engine_for(&pair.symbol);
        let engine = engine.lock().expect("pair engine mutex poisoned");
        Ok(engine.book_snapshot(depth))
    }

    /// Open orders for one account, filtered by pair/side
    pub fn open_orders(&self, account_id: AccountId, filter: &OrderFilter) -> Vec<Order> {
        self.store.open_orders_for(account_id, filter)
    }

    /// One order by id, any state
    pub fn order(&self, order_id: &OrderId) -> Option<Order> {
        self.store.get(order_id)
    }

    /// Trades filtered by pair and/or account, newest first
    pub fn trades(&self, filter: &TradeFilter) -> Vec<Trade> {
        let trades = self.trades.lock().expect("trade store mutex poisoned");
        let mut matched: Vec<Trade> = trades
            .iter()
            .filter(|trade| {
                if let Some(symbol) = &filter.symbol {
                    if &trade.symbol != symbol {
                        return false;
                    }
                }
                if let Some(account_id) = filter.account_id {
                    if trade.maker_account_id != account_id
                        && trade.taker_account_id != account_id
                    {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        matched.reverse();
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        matched
    }

    /// External funds in
    pub fn deposit(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<Wallet, LedgerError> {
        self.ledger.deposit(account_id, asset, amount, Self::now_nanos())
    }

    /// External funds out
    pub fn withdraw(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
    ) -> Result<Wallet, LedgerError> {
        self.ledger.withdraw(account_id, asset, amount, Self::now_nanos())
    }

    /// Wallet snapshot
    pub fn balance(&self, account_id: AccountId, asset: &str) -> Option<Wallet> {
        self.ledger.balance(account_id, asset)
    }

    /// Rebuild every registered pair's book from the stored open orders
    /// (restart path); resting orders keep their price-time priority
    pub fn restore_books(&self) {
        for symbol in self.registry.symbols() {
            let Some(market) = MarketId::try_new(symbol.clone()) else {
                continue;
            };
            let open = self.store.open_orders_for_symbol(&market);
            let engine = self.engine_for(&market);
            let mut engine = engine.lock().expect("pair engine mutex poisoned");
            engine.restore(&open);
            info!(symbol = %market, orders = open.len(), "book restored");
        }
    }
}
