//! Full journal flow: file-backed ledger, bulk import, session refresh
//! and persisted derived state.

use chrono::{TimeZone, Utc};
use tradeforge::journal::{export_trades, import_trades};
use tradeforge::{
    JournalSession, Price, Size, StaticPrices, Symbol, TradeDraft, TradeFilter, TradeLedger,
    TradeSide,
};

fn draft(day: u32, symbol: &str, side: TradeSide, price: &str, qty: &str) -> TradeDraft {
    TradeDraft::new(
        Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
        symbol,
        side,
        Price::from_str(price).unwrap(),
        Size::from_str(qty).unwrap(),
    )
}

#[test]
fn bulk_import_partial_success() {
    // Five rows, the third with a negative quantity: four land, one fails.
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("batch.csv");
    std::fs::write(
        &csv_path,
        "timestamp,instrument,asset_class,side,unit_price,quantity,fees,notes\n\
         2024-01-10T10:00:00Z,AAPL,Stock,Buy,150,10,0,\n\
         2024-01-11T10:00:00Z,NVDA,Stock,Buy,500,2,0,\n\
         2024-01-12T10:00:00Z,AAPL,Stock,Sell,155,-5,0,\n\
         2024-01-13T10:00:00Z,MSFT,Stock,Buy,300,5,0,\n\
         2024-01-14T10:00:00Z,NVDA,Stock,Sell,520,2,0,\n",
    )
    .unwrap();

    let mut ledger = TradeLedger::in_memory();
    let summary = import_trades(&mut ledger, &csv_path).unwrap();
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(ledger.len(), 4);
}

#[test]
fn session_over_file_backed_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("trades.json");

    let mut session = JournalSession::new(TradeLedger::open(&ledger_path).unwrap());
    session
        .ledger_mut()
        .add(draft(1, "AAPL", TradeSide::Buy, "100", "10"))
        .unwrap();
    session
        .ledger_mut()
        .add(draft(2, "AAPL", TradeSide::Sell, "120", "5"))
        .unwrap();

    let prices = StaticPrices::new().with_price("AAPL", Price::from_str("130").unwrap());
    let snapshot = session.refresh(Some(&prices)).unwrap();
    // Realized: (120 - 100) * 5 = 100. Unrealized: (130 - 100) * 5 = 150.
    assert_eq!(snapshot.total_pnl, Price::from_str("250").unwrap());

    // Derived P&L survives a reopen as a cached column.
    drop(session);
    let reopened = TradeLedger::open(&ledger_path).unwrap();
    let trades = reopened.list(Some(&TradeFilter::for_instrument("AAPL")));
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[1].realized_pnl(), Price::from_str("100").unwrap());
    assert_eq!(trades[1].unrealized_pnl(), Price::from_str("150").unwrap());
}

#[test]
fn export_then_reimport_preserves_history() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("journal.csv");

    let mut ledger = TradeLedger::in_memory();
    ledger
        .add(draft(1, "AAPL", TradeSide::Buy, "100", "10"))
        .unwrap();
    ledger
        .add(draft(2, "0700.HK", TradeSide::Buy, "350", "100"))
        .unwrap();
    export_trades(&ledger, &csv_path).unwrap();

    let mut restored = TradeLedger::in_memory();
    let summary = import_trades(&mut restored, &csv_path).unwrap();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);

    let hk = restored.list(Some(&TradeFilter::for_instrument("0700.HK")));
    assert_eq!(hk[0].currency(), "HKD");
    assert_eq!(hk[0].gross_cost(), Price::from_str("35000").unwrap());
}

#[test]
fn instrument_replays_survive_bad_neighbors() {
    // A sell with no position in one instrument must not disturb the
    // P&L of another instrument.
    let mut session = JournalSession::new(TradeLedger::in_memory());
    session
        .ledger_mut()
        .add(draft(1, "GME", TradeSide::Sell, "400", "10"))
        .unwrap();
    session
        .ledger_mut()
        .add(draft(1, "AAPL", TradeSide::Buy, "100", "10"))
        .unwrap();
    session
        .ledger_mut()
        .add(draft(2, "AAPL", TradeSide::Sell, "110", "10"))
        .unwrap();

    let snapshot = session.refresh(None).unwrap();
    assert_eq!(snapshot.total_pnl, Price::from_str("100").unwrap());
    assert_eq!(
        snapshot.instrument_pnl[&Symbol::new("GME")],
        Price::ZERO
    );
}
