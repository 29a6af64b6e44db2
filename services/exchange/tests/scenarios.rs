//! End-to-end scenarios through the public exchange surface
//!
//! Exercises the full pipeline — registry, reservation, matching,
//! settlement, events — the way the web layer drives it.

use exchange::{Exchange, TradeFilter};
use matching_engine::{EngineConfig, OrderFilter};
use rust_decimal::Decimal;
use types::errors::EngineError;
use types::events::ExchangeEvent;
use types::ids::{AccountId, MarketId};
use types::market::TradingPair;
use types::numeric::{Price, Quantity};
use types::order::{OrderStatus, OrderType, Side};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn qty(s: &str) -> Quantity {
    Quantity::from_str(s).unwrap()
}

fn make_pair(symbol: &str) -> TradingPair {
    TradingPair::new(
        MarketId::new(symbol),
        Price::from_u64(1),
        Price::from_u64(1_000_000),
        qty("0.001"),
        Decimal::ONE,
        2,
        4,
        dec("0.001"), // maker 0.1%
        dec("0.002"), // taker 0.2%
        1708123456789000000,
    )
}

/// Resting ask, crossing buy: one trade at the maker's price, both
/// orders filled, both wallets settled net of fees, events emitted.
#[test]
fn resting_ask_full_lifecycle() {
    init_tracing();
    let (exchange, mut rx) = Exchange::new(EngineConfig::default());
    exchange.registry().register(make_pair("BTC/USDT"));

    let alice = AccountId::new(); // maker, sells 1 BTC
    let bob = AccountId::new(); // taker, buys with 100 USDT
    exchange.deposit(alice, "BTC", dec("1.0")).unwrap();
    exchange.deposit(bob, "USDT", dec("100")).unwrap();

    let ask = exchange
        .submit_order(
            alice,
            "BTC/USDT",
            Side::SELL,
            OrderType::LIMIT,
            qty("1.0"),
            Some(Price::from_u64(100)),
        )
        .unwrap();
    assert_eq!(ask.status, OrderStatus::Open);
    assert_eq!(exchange.balance(alice, "BTC").unwrap().reserved, dec("1.0"));

    let buy = exchange
        .submit_order(
            bob,
            "BTC/USDT",
            Side::BUY,
            OrderType::LIMIT,
            qty("1.0"),
            Some(Price::from_u64(100)),
        )
        .unwrap();
    assert_eq!(buy.status, OrderStatus::Filled);

    // One trade at the maker's price
    let trades = exchange.trades(&TradeFilter::default());
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price, Price::from_u64(100));
    assert_eq!(trades[0].quantity, qty("1.0"));
    assert_eq!(trades[0].maker_order_id, ask.order_id);

    // Alice: BTC reservation consumed, quote received minus 0.1 maker fee
    let alice_btc = exchange.balance(alice, "BTC").unwrap();
    assert_eq!(alice_btc.reserved, Decimal::ZERO);
    assert_eq!(exchange.balance(alice, "USDT").unwrap().available, dec("99.9"));

    // Bob: USDT reservation consumed, base received minus 0.002 taker fee
    let bob_usdt = exchange.balance(bob, "USDT").unwrap();
    assert_eq!(bob_usdt.reserved, Decimal::ZERO);
    assert_eq!(exchange.balance(bob, "BTC").unwrap().available, dec("0.998"));

    // Conservation: trading changed nothing system-wide
    assert_eq!(exchange.ledger().asset_total("USDT"), dec("100"));
    assert_eq!(exchange.ledger().asset_total("BTC"), dec("1.0"));

    // Event stream: created, created, trade, maker filled, taker filled
    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        kinds.push(match event {
            ExchangeEvent::OrderCreated(_) => "created",
            ExchangeEvent::OrderPartiallyFilled(_) => "partial",
            ExchangeEvent::OrderFilled(_) => "filled",
            ExchangeEvent::OrderCancelled(_) => "cancelled",
            ExchangeEvent::TradeExecuted(_) => "trade",
        });
    }
    assert_eq!(kinds, vec!["created", "created", "trade", "filled", "filled"]);
}

#[test]
fn partial_fill_leaves_remainder_resting() {
    init_tracing();
    let (exchange, _rx) = Exchange::new(EngineConfig::default());
    exchange.registry().register(make_pair("BTC/USDT"));

    let alice = AccountId::new();
    let bob = AccountId::new();
    exchange.deposit(alice, "BTC", dec("2.0")).unwrap();
    exchange.deposit(bob, "USDT", dec("100")).unwrap();

    let ask = exchange
        .submit_order(
            alice,
            "BTC/USDT",
            Side::SELL,
            OrderType::LIMIT,
            qty("2.0"),
            Some(Price::from_u64(100)),
        )
        .unwrap();
    let buy = exchange
        .submit_order(
            bob,
            "BTC/USDT",
            Side::BUY,
            OrderType::LIMIT,
            qty("1.0"),
            Some(Price::from_u64(100)),
        )
        .unwrap();

    assert_eq!(buy.status, OrderStatus::Filled);
    let resting = exchange.order(&ask.order_id).unwrap();
    assert_eq!(resting.status, OrderStatus::PartiallyFilled);
    assert_eq!(resting.remaining_amount, qty("1.0"));

    let book = exchange.order_book("BTC/USDT", 10).unwrap();
    assert_eq!(book.asks.len(), 1);
    assert_eq!(book.asks[0].1, qty("1.0"));
}

#[test]
fn insufficient_funds_rejected_without_side_effects() {
    init_tracing();
    let (exchange, mut rx) = Exchange::new(EngineConfig::default());
    exchange.registry().register(make_pair("BTC/USDT"));

    let bob = AccountId::new();
    exchange.deposit(bob, "USDT", dec("50")).unwrap();

    let result = exchange.submit_order(
        bob,
        "BTC/USDT",
        Side::BUY,
        OrderType::LIMIT,
        qty("1.0"),
        Some(Price::from_u64(100)),
    );

    assert!(matches!(result, Err(ref e) if e.is_insufficient_funds()));
    assert!(exchange.open_orders(bob, &OrderFilter::default()).is_empty());
    let wallet = exchange.balance(bob, "USDT").unwrap();
    assert_eq!(wallet.available, dec("50"));
    assert_eq!(wallet.reserved, Decimal::ZERO);
    // No events either
    assert!(rx.try_recv().is_err());
}

#[test]
fn cancellation_restores_wallet() {
    init_tracing();
    let (exchange, _rx) = Exchange::new(EngineConfig::default());
    exchange.registry().register(make_pair("BTC/USDT"));

    let bob = AccountId::new();
    exchange.deposit(bob, "USDT", dec("1000")).unwrap();

    let order = exchange
        .submit_order(
            bob,
            "BTC/USDT",
            Side::BUY,
            OrderType::LIMIT,
            qty("1.0"),
            Some(Price::from_u64(100)),
        )
        .unwrap();
    assert_eq!(exchange.balance(bob, "USDT").unwrap().reserved, dec("100"));

    let cancelled = exchange.cancel_order(order.order_id, bob).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let wallet = exchange.balance(bob, "USDT").unwrap();
    assert_eq!(wallet.available, dec("1000"));
    assert_eq!(wallet.reserved, Decimal::ZERO);

    // Cancelling again is an invalid state, and wallets stay untouched
    let again = exchange.cancel_order(order.order_id, bob);
    assert!(matches!(again, Err(EngineError::Order(_))));
    assert_eq!(exchange.balance(bob, "USDT").unwrap().available, dec("1000"));
}

/// Orders on different pairs run concurrently and share quote wallets;
/// the ledger's per-wallet atomicity keeps every balance consistent.
#[test]
fn concurrent_pairs_share_wallets_safely() {
    init_tracing();
    let (exchange, _rx) = Exchange::new(EngineConfig::default());
    exchange.registry().register(make_pair("BTC/USDT"));
    exchange.registry().register(make_pair("ETH/USDT"));
    let exchange = std::sync::Arc::new(exchange);

    let maker = AccountId::new();
    let taker = AccountId::new();
    exchange.deposit(maker, "BTC", dec("50")).unwrap();
    exchange.deposit(maker, "ETH", dec("50")).unwrap();
    // One shared USDT wallet funds the taker on both pairs
    exchange.deposit(taker, "USDT", dec("10000")).unwrap();

    for (symbol, price) in [("BTC/USDT", 100u64), ("ETH/USDT", 10u64)] {
        for i in 0..10 {
            exchange
                .submit_order(
                    maker,
                    symbol,
                    Side::SELL,
                    OrderType::LIMIT,
                    qty("1.0"),
                    Some(Price::from_u64(price + i)),
                )
                .unwrap();
        }
    }

    std::thread::scope(|scope| {
        for symbol in ["BTC/USDT", "ETH/USDT"] {
            let exchange = std::sync::Arc::clone(&exchange);
            scope.spawn(move || {
                for _ in 0..10 {
                    exchange
                        .submit_order(
                            taker,
                            symbol,
                            Side::BUY,
                            OrderType::MARKET,
                            qty("1.0"),
                            Some(Price::from_u64(200)),
                        )
                        .unwrap();
                }
            });
        }
    });

    // All 20 asks consumed
    assert_eq!(exchange.trades(&TradeFilter::default()).len(), 20);

    // Nothing minted, nothing lost, nothing negative
    assert_eq!(exchange.ledger().asset_total("USDT"), dec("10000"));
    assert_eq!(exchange.ledger().asset_total("BTC"), dec("50"));
    assert_eq!(exchange.ledger().asset_total("ETH"), dec("50"));
    for asset in ["USDT", "BTC", "ETH"] {
        for account in [maker, taker] {
            if let Some(wallet) = exchange.balance(account, asset) {
                assert!(wallet.check_invariant());
                assert_eq!(wallet.reserved, Decimal::ZERO);
            }
        }
    }
}

/// A resting order keeps the fee rates captured at admission even after
/// an administrator reprices the pair.
#[test]
fn fee_schedule_change_does_not_reprice_resting_orders() {
    init_tracing();
    let (exchange, _rx) = Exchange::new(EngineConfig::default());
    exchange.registry().register(make_pair("BTC/USDT"));

    let alice = AccountId::new();
    let bob = AccountId::new();
    exchange.deposit(alice, "BTC", dec("1.0")).unwrap();
    exchange.deposit(bob, "USDT", dec("100")).unwrap();

    exchange
        .submit_order(
            alice,
            "BTC/USDT",
            Side::SELL,
            OrderType::LIMIT,
            qty("1.0"),
            Some(Price::from_u64(100)),
        )
        .unwrap();

    // Admin makes fees ruinous after the ask rested
    exchange
        .registry()
        .update_fees("BTC/USDT", dec("0.5"), dec("0.5"));

    exchange
        .submit_order(
            bob,
            "BTC/USDT",
            Side::BUY,
            OrderType::LIMIT,
            qty("1.0"),
            Some(Price::from_u64(100)),
        )
        .unwrap();

    let trades = exchange.trades(&TradeFilter::default());
    assert_eq!(trades.len(), 1);
    // Maker pays the 0.1% it was admitted under, not the new 50%
    assert_eq!(trades[0].maker_fee, dec("0.1"));
    assert_eq!(
        exchange.balance(alice, "USDT").unwrap().available,
        dec("99.9")
    );
    // Taker admitted after the change pays the new rate
    assert_eq!(trades[0].taker_fee, dec("0.5"));
}
