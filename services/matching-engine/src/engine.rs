//! Per-pair matching engine
//!
//! One `PairEngine` owns one trading pair's book. Admission runs the
//! full pipeline — validate, reserve, match, settle each trade, rest the
//! remainder — under whatever serialization boundary the caller puts
//! around the engine; nothing here is safe to reenter for the same pair.
//!
//! Execution price is always the resting (maker) order's price. Trade
//! quantity is the smaller of the two remainders. Settlement runs per
//! trade, before the loop continues; a settlement failure freezes the
//! incoming order in `NeedsReview` and halts its matching.

use rust_decimal::Decimal;
use settlement::SettlementCoordinator;
use std::sync::Arc;
use tracing::{debug, error, warn};
use types::errors::{EngineError, OrderError, OrderRejectReason};
use types::events::ExchangeEvent;
use types::ids::{AccountId, MarketId, OrderId};
use types::market::TradingPair;
use types::numeric::{Price, Quantity};
use types::order::{FeeSnapshot, Order, OrderStatus, OrderType, Side};
use types::trade::Trade;
use wallet_ledger::WalletLedger;

use crate::book::{BookSnapshot, OrderBook};
use crate::config::EngineConfig;
use crate::matching::{crossing, TradeBuilder};
use crate::registry;
use crate::store::OrderStore;

/// An order submission, pre-admission
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub account_id: AccountId,
    pub side: Side,
    pub order_type: OrderType,
    pub amount: Quantity,
    /// Limit price for LIMIT orders. For MARKET orders this is the
    /// optional worst-acceptable price cap; a market buy without it is
    /// capped at best ask plus the configured slippage buffer.
    pub limit_price: Option<Price>,
}

/// Result of a submission: the post-mutation order, the trades it
/// produced (failed settlements included, recorded as FAILED), and the
/// events to publish
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub order: Order,
    pub trades: Vec<Trade>,
    pub events: Vec<ExchangeEvent>,
}

/// How a submission's funds reservation is priced
struct ReservePlan {
    /// Price the reservation and the notional check are computed at
    reserve_price: Price,
    /// Crossing bound passed to the match loop; None = uncapped market
    crossing_limit: Option<Price>,
}

/// Matching engine for one trading pair
pub struct PairEngine {
    symbol: MarketId,
    book: OrderBook,
    builder: TradeBuilder,
    ledger: Arc<WalletLedger>,
    settler: Arc<SettlementCoordinator>,
    store: Arc<OrderStore>,
    config: EngineConfig,
}

impl PairEngine {
    pub fn new(
        symbol: MarketId,
        ledger: Arc<WalletLedger>,
        settler: Arc<SettlementCoordinator>,
        store: Arc<OrderStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            symbol,
            book: OrderBook::new(),
            builder: TradeBuilder::new(1),
            ledger,
            settler,
            store,
            config,
        }
    }

    pub fn symbol(&self) -> &MarketId {
        &self.symbol
    }

    /// Depth snapshot of this pair's book
    pub fn book_snapshot(&self, depth: usize) -> BookSnapshot {
        self.book.snapshot(self.symbol.as_str(), depth)
    }

    /// Admit and match one order
    ///
    /// Validation and reservation failures are side-effect free: a
    /// validation reject stores the order for audit and reserves
    /// nothing; an insufficient-funds reject creates no order at all.
    pub fn submit(
        &mut self,
        req: SubmitRequest,
        pair: &TradingPair,
        timestamp: i64,
    ) -> Result<SubmitOutcome, EngineError> {
        let mut order = self.build_order(&req, pair, timestamp)?;

        // Price the reservation; market orders without a usable
        // reference are rejected before funds are touched.
        let plan = match self.reserve_plan(&req) {
            Ok(plan) => plan,
            Err(reason) => {
                order.reject(reason.clone(), timestamp);
                self.store.upsert(order);
                return Err(reason.into());
            }
        };

        // Pair limits; bounds apply to limit prices only
        let bounds_price = match req.order_type {
            OrderType::LIMIT => req.limit_price,
            OrderType::MARKET => None,
        };
        if let Err(reason) =
            registry::validate_limits(pair, bounds_price, req.amount, plan.reserve_price)
        {
            order.reject(reason.clone(), timestamp);
            self.store.upsert(order);
            return Err(reason.into());
        }

        // Reserve before the order can touch the book. On failure the
        // order is never created (nothing stored, nothing reserved).
        let (reserve_asset, reserve_amount) = match req.side {
            Side::BUY => (
                pair.quote(),
                plan.reserve_price.as_decimal() * req.amount.as_decimal(),
            ),
            Side::SELL => (pair.base(), req.amount.as_decimal()),
        };
        self.ledger.reserve(
            order.account_id,
            reserve_asset,
            reserve_amount,
            order.order_id,
            timestamp,
        )?;

        debug!(
            order_id = %order.order_id,
            symbol = %self.symbol,
            side = ?req.side,
            amount = %req.amount,
            "order admitted"
        );

        let mut events = vec![ExchangeEvent::OrderCreated(order.clone())];
        let mut trades = Vec::new();

        // Match loop: always against the oldest order at the best
        // opposing price, at that maker's price.
        while !order.remaining_amount.is_zero() {
            let Some((maker_price, maker_entry)) = self.book.peek_opposite(req.side) else {
                break;
            };
            if !crossing::taker_crosses(req.side, plan.crossing_limit, maker_price) {
                break;
            }

            let Some(mut maker_order) = self.store.get(&maker_entry.order_id) else {
                error!(
                    order_id = %maker_entry.order_id,
                    symbol = %self.symbol,
                    "book entry without a stored order; dropping it"
                );
                self.book.pop_opposite_front(req.side);
                continue;
            };

            let fill_qty = order.remaining_amount.min(maker_entry.remaining);
            let mut trade =
                self.builder
                    .build(pair, &maker_order, &order, maker_price, fill_qty, timestamp);

            if self
                .settler
                .settle_trade(&mut trade, pair, timestamp)
                .is_err()
            {
                // Fatal for this order: freeze it, keep the failed trade
                // on record, leave the maker resting. Reservations stay
                // intact for the operator.
                order.mark_needs_review(timestamp);
                self.store.upsert(order.clone());
                trades.push(trade);
                error!(
                    order_id = %order.order_id,
                    symbol = %self.symbol,
                    "matching halted pending operator review"
                );
                return Ok(SubmitOutcome {
                    order,
                    trades,
                    events,
                });
            }

            maker_order.add_fill(fill_qty, timestamp)?;
            order.add_fill(fill_qty, timestamp)?;

            // A buy taker reserved at its limit/cap but executed at the
            // maker's price; release the surplus so the outstanding
            // reservation stays remaining × limit.
            if req.side == Side::BUY && maker_price < plan.reserve_price {
                let surplus = (plan.reserve_price.as_decimal() - maker_price.as_decimal())
                    * fill_qty.as_decimal();
                self.ledger.release(
                    order.account_id,
                    pair.quote(),
                    surplus,
                    order.order_id,
                    timestamp,
                )?;
            }

            if maker_order.is_filled() {
                self.book.pop_opposite_front(req.side);
            } else {
                self.book
                    .reduce_opposite_front(req.side, maker_order.remaining_amount);
            }
            self.store.upsert(maker_order.clone());

            events.push(ExchangeEvent::TradeExecuted(trade.clone()));
            events.push(ExchangeEvent::for_fill(&maker_order));
            trades.push(trade);
        }

        match req.order_type {
            OrderType::MARKET => {
                // Market remainders never rest: finalize and refund the
                // unused reservation.
                let leftover = order.remaining_amount;
                order.finalize_market(timestamp);
                if !leftover.is_zero() {
                    let (asset, amount) = match req.side {
                        Side::BUY => (
                            pair.quote(),
                            plan.reserve_price.as_decimal() * leftover.as_decimal(),
                        ),
                        Side::SELL => (pair.base(), leftover.as_decimal()),
                    };
                    self.ledger.release(
                        order.account_id,
                        asset,
                        amount,
                        order.order_id,
                        timestamp,
                    )?;
                }
                if order.status == OrderStatus::Cancelled {
                    events.push(ExchangeEvent::OrderCancelled(order.clone()));
                } else {
                    events.push(ExchangeEvent::OrderFilled(order.clone()));
                }
            }
            OrderType::LIMIT => {
                if !order.remaining_amount.is_zero() {
                    // Rest the remainder at the original price and the
                    // original arrival timestamp (time priority kept).
                    if let Some(price) = order.price {
                        self.book.insert(
                            req.side,
                            order.order_id,
                            price,
                            order.remaining_amount,
                            order.created_at,
                        );
                    }
                }
                if order.has_fills() {
                    events.push(ExchangeEvent::for_fill(&order));
                }
            }
        }

        self.store.upsert(order.clone());
        Ok(SubmitOutcome {
            order,
            trades,
            events,
        })
    }

    /// Cancel a resting order: remove it from the book, release the
    /// remaining reservation, and retain the terminal record
    pub fn cancel(
        &mut self,
        order_id: OrderId,
        account_id: AccountId,
        timestamp: i64,
    ) -> Result<(Order, Vec<ExchangeEvent>), EngineError> {
        let Some(mut order) = self.store.get(&order_id) else {
            return Err(OrderError::NotFound {
                order_id: order_id.to_string(),
            }
            .into());
        };
        if order.account_id != account_id {
            return Err(OrderError::Unauthorized {
                order_id: order_id.to_string(),
            }
            .into());
        }
        if !order.status.can_cancel() {
            return Err(OrderError::InvalidState {
                order_id: order_id.to_string(),
                status: format!("{:?}", order.status),
            }
            .into());
        }

        // Remaining reservation: remaining × price in quote for buys,
        // remaining in base for sells.
        let (asset, amount) = match (order.side, order.price) {
            (Side::BUY, Some(price)) => (
                order.symbol.quote(),
                price.as_decimal() * order.remaining_amount.as_decimal(),
            ),
            (Side::SELL, _) => (order.symbol.base(), order.remaining_amount.as_decimal()),
            (Side::BUY, None) => {
                // A cancellable market buy cannot exist; market orders
                // finalize within their own admission.
                error!(order_id = %order_id, "open market buy found during cancel");
                return Err(OrderError::InvalidState {
                    order_id: order_id.to_string(),
                    status: format!("{:?}", order.status),
                }
                .into());
            }
        };
        if amount > Decimal::ZERO {
            self.ledger
                .release(order.account_id, asset, amount, order.order_id, timestamp)?;
        }

        if let Some(price) = order.price {
            self.book.remove(order.side, &order_id, price);
        }

        order.cancel(timestamp)?;
        self.store.upsert(order.clone());
        debug!(order_id = %order_id, symbol = %self.symbol, "order cancelled");

        let events = vec![ExchangeEvent::OrderCancelled(order.clone())];
        Ok((order, events))
    }

    /// Rebuild the book from stored open orders (restart path); ordering
    /// falls out of price-keyed levels plus arrival-time insertion
    pub fn restore(&mut self, orders: &[Order]) {
        self.book = OrderBook::new();
        for order in orders {
            if order.status.is_terminal() || order.symbol != self.symbol {
                continue;
            }
            let Some(price) = order.price else {
                warn!(order_id = %order.order_id, "open market order cannot rest; skipped");
                continue;
            };
            self.book.insert(
                order.side,
                order.order_id,
                price,
                order.remaining_amount,
                order.created_at,
            );
        }
    }

    fn build_order(
        &self,
        req: &SubmitRequest,
        pair: &TradingPair,
        timestamp: i64,
    ) -> Result<Order, EngineError> {
        match req.order_type {
            OrderType::LIMIT => {
                let price = req
                    .limit_price
                    .ok_or(OrderRejectReason::MissingLimitPrice)?;
                Ok(Order::limit(
                    req.account_id,
                    self.symbol.clone(),
                    req.side,
                    price,
                    req.amount,
                    FeeSnapshot::from(pair),
                    timestamp,
                ))
            }
            OrderType::MARKET => Ok(Order::market(
                req.account_id,
                self.symbol.clone(),
                req.side,
                req.amount,
                FeeSnapshot::from(pair),
                timestamp,
            )),
        }
    }

    fn reserve_plan(&self, req: &SubmitRequest) -> Result<ReservePlan, OrderRejectReason> {
        match (req.order_type, req.side) {
            (OrderType::LIMIT, _) => {
                let price = req
                    .limit_price
                    .ok_or(OrderRejectReason::MissingLimitPrice)?;
                Ok(ReservePlan {
                    reserve_price: price,
                    crossing_limit: Some(price),
                })
            }
            (OrderType::MARKET, Side::BUY) => {
                // Cap wins; otherwise best ask plus the slippage buffer.
                let cap = match req.limit_price {
                    Some(cap) => cap,
                    None => {
                        let (best_ask, _) = self
                            .book
                            .best_ask()
                            .ok_or(OrderRejectReason::NoMarketPrice)?;
                        let buffered = best_ask.as_decimal()
                            * (Decimal::ONE + self.config.market_slippage_buffer);
                        Price::try_new(buffered).map_err(|_| OrderRejectReason::NoMarketPrice)?
                    }
                };
                Ok(ReservePlan {
                    reserve_price: cap,
                    crossing_limit: Some(cap),
                })
            }
            (OrderType::MARKET, Side::SELL) => {
                // The base reservation needs no price; the reference only
                // prices the notional check.
                let reference = match req.limit_price {
                    Some(cap) => cap,
                    None => self
                        .book
                        .best_bid()
                        .map(|(price, _)| price)
                        .ok_or(OrderRejectReason::NoMarketPrice)?,
                };
                Ok(ReservePlan {
                    reserve_price: reference,
                    crossing_limit: req.limit_price,
                })
            }
        }
    }
}
