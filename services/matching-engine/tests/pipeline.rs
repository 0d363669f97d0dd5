//! End-to-end pipeline tests
//!
//! Each test feeds a CSV order stream through the real thread topology
//! (reader -> router -> book workers -> writer) and asserts on the CSV
//! records that come out the other side.

use matching_engine::io::{drain_records, read_orders};
use matching_engine::{Engine, HandoffQueue};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const INPUT_HEADER: &str = "timestamp,order_id,instrument,side,type,quantity,price,action";
const OUTPUT_HEADER: &str = "timestamp,order_id,instrument,side,type,quantity,price,action,status,executed_quantity,execution_price,counterparty_id";

/// Run the full pipeline over an in-memory order stream; returns every
/// output line, header included.
fn run_pipeline(rows: &[&str]) -> Vec<String> {
    let input = format!("{INPUT_HEADER}\n{}\n", rows.join("\n"));

    let input_queue = Arc::new(HandoffQueue::bounded(1024));
    let record_queue = Arc::new(HandoffQueue::unbounded());
    let done_reading = Arc::new(AtomicBool::new(false));
    let books_stopped = Arc::new(AtomicBool::new(false));

    let reader = {
        let input_queue = Arc::clone(&input_queue);
        let done_reading = Arc::clone(&done_reading);
        thread::spawn(move || {
            read_orders(Cursor::new(input), &input_queue).unwrap();
            done_reading.store(true, Ordering::Release);
        })
    };

    let router = {
        let input_queue = Arc::clone(&input_queue);
        let record_queue = Arc::clone(&record_queue);
        let done_reading = Arc::clone(&done_reading);
        let books_stopped = Arc::clone(&books_stopped);
        thread::spawn(move || {
            let mut engine = Engine::new(record_queue, 1024);
            while !done_reading.load(Ordering::Acquire) || !input_queue.is_empty() {
                match input_queue.try_pop() {
                    Some(order) => engine.submit(order),
                    None => thread::sleep(Duration::from_micros(100)),
                }
            }
            engine.shutdown();
            books_stopped.store(true, Ordering::Release);
        })
    };

    let mut out = Vec::new();
    drain_records(&mut out, &record_queue, &books_stopped).unwrap();
    reader.join().unwrap();
    router.join().unwrap();

    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_simple_cross() {
    let lines = run_pipeline(&[
        "1,1,X,BUY,LIMIT,10,100,NEW",
        "2,2,X,SELL,LIMIT,10,100,NEW",
    ]);

    assert_eq!(
        lines,
        vec![
            OUTPUT_HEADER,
            "1,1,X,BUY,LIMIT,10,100,NEW,PENDING,0,0,0",
            "2,2,X,SELL,LIMIT,10,100,NEW,PENDING,0,0,0",
            "2,1,X,BUY,LIMIT,0,100,NEW,EXECUTED,10,100,2",
            "2,2,X,SELL,LIMIT,0,100,NEW,EXECUTED,10,100,1",
        ]
    );
}

#[test]
fn test_partial_fill_with_resting_residual() {
    let lines = run_pipeline(&[
        "1,1,X,BUY,LIMIT,10,100,NEW",
        "2,2,X,SELL,LIMIT,4,100,NEW",
    ]);

    assert_eq!(
        lines[1..],
        [
            "1,1,X,BUY,LIMIT,10,100,NEW,PENDING,0,0,0",
            "2,2,X,SELL,LIMIT,4,100,NEW,PENDING,0,0,0",
            "2,1,X,BUY,LIMIT,6,100,NEW,PARTIALLY_EXECUTED,4,100,2",
            "2,2,X,SELL,LIMIT,0,100,NEW,EXECUTED,4,100,1",
        ]
    );
}

#[test]
fn test_market_sweep_across_two_levels() {
    let lines = run_pipeline(&[
        "1,1,X,SELL,LIMIT,5,101,NEW",
        "2,2,X,SELL,LIMIT,5,102,NEW",
        "3,3,X,BUY,MARKET,8,,NEW",
    ]);

    assert_eq!(
        lines[1..],
        [
            "1,1,X,SELL,LIMIT,5,101,NEW,PENDING,0,0,0",
            "2,2,X,SELL,LIMIT,5,102,NEW,PENDING,0,0,0",
            "3,1,X,SELL,LIMIT,0,101,NEW,EXECUTED,5,101,3",
            "3,3,X,BUY,MARKET,3,0,NEW,PARTIALLY_EXECUTED,5,101,1",
            "3,2,X,SELL,LIMIT,2,102,NEW,PARTIALLY_EXECUTED,3,102,3",
            "3,3,X,BUY,MARKET,0,0,NEW,EXECUTED,3,102,2",
        ]
    );
}

#[test]
fn test_cancel_of_resting_order() {
    let lines = run_pipeline(&[
        "1,1,X,BUY,LIMIT,10,100,NEW",
        "2,1,X,BUY,LIMIT,10,100,CANCEL",
    ]);

    assert_eq!(
        lines[1..],
        [
            "1,1,X,BUY,LIMIT,10,100,NEW,PENDING,0,0,0",
            "2,1,X,BUY,LIMIT,0,0,CANCEL,CANCELED,0,0,0",
        ]
    );
}

#[test]
fn test_cancel_of_unknown_id_is_rejected() {
    let lines = run_pipeline(&["1,99,X,BUY,LIMIT,10,100,CANCEL"]);

    assert_eq!(lines[1..], ["1,99,X,BUY,LIMIT,10,100,CANCEL,REJECTED,0,0,0"]);
}

#[test]
fn test_modify_that_crosses_immediately() {
    let lines = run_pipeline(&[
        "1,1,X,BUY,LIMIT,10,100,NEW",
        "2,2,X,SELL,LIMIT,10,101,NEW",
        "3,1,X,BUY,LIMIT,10,101,MODIFY",
    ]);

    assert_eq!(
        lines[1..],
        [
            "1,1,X,BUY,LIMIT,10,100,NEW,PENDING,0,0,0",
            "2,2,X,SELL,LIMIT,10,101,NEW,PENDING,0,0,0",
            "3,1,X,BUY,LIMIT,0,101,MODIFY,EXECUTED,10,101,2",
            "3,2,X,SELL,LIMIT,0,101,NEW,EXECUTED,10,101,1",
        ]
    );
}

#[test]
fn test_malformed_rows_do_not_disturb_the_stream() {
    let lines = run_pipeline(&[
        "1,1,X,BUY,LIMIT,10,100,NEW",
        "garbage,row",
        "2,2,X,SELL,LIMIT,banana,100,NEW",
        "3,3,X,SELL,LIMIT,10,100,NEW",
    ]);

    assert_eq!(
        lines[1..],
        [
            "1,1,X,BUY,LIMIT,10,100,NEW,PENDING,0,0,0",
            "3,3,X,SELL,LIMIT,10,100,NEW,PENDING,0,0,0",
            "3,1,X,BUY,LIMIT,0,100,NEW,EXECUTED,10,100,3",
            "3,3,X,SELL,LIMIT,0,100,NEW,EXECUTED,10,100,1",
        ]
    );
}

#[test]
fn test_per_instrument_order_is_preserved() {
    // Two independent instruments interleaved in the input; each must see
    // its own events in input order even though global interleaving is free.
    let lines = run_pipeline(&[
        "1,1,AAA,BUY,LIMIT,10,100,NEW",
        "2,10,BBB,SELL,LIMIT,5,200,NEW",
        "3,2,AAA,SELL,LIMIT,10,100,NEW",
        "4,11,BBB,BUY,LIMIT,5,200,NEW",
        "5,3,AAA,BUY,LIMIT,1,90,NEW",
        "6,12,BBB,SELL,LIMIT,1,300,NEW",
    ]);

    let per_instrument = |name: &str| -> Vec<String> {
        lines[1..]
            .iter()
            .filter(|l| l.split(',').nth(2) == Some(name))
            .cloned()
            .collect()
    };

    assert_eq!(
        per_instrument("AAA"),
        vec![
            "1,1,AAA,BUY,LIMIT,10,100,NEW,PENDING,0,0,0",
            "3,2,AAA,SELL,LIMIT,10,100,NEW,PENDING,0,0,0",
            "3,1,AAA,BUY,LIMIT,0,100,NEW,EXECUTED,10,100,2",
            "3,2,AAA,SELL,LIMIT,0,100,NEW,EXECUTED,10,100,1",
            "5,3,AAA,BUY,LIMIT,1,90,NEW,PENDING,0,0,0",
        ]
    );
    assert_eq!(
        per_instrument("BBB"),
        vec![
            "2,10,BBB,SELL,LIMIT,5,200,NEW,PENDING,0,0,0",
            "4,11,BBB,BUY,LIMIT,5,200,NEW,PENDING,0,0,0",
            "4,11,BBB,BUY,LIMIT,0,200,NEW,EXECUTED,5,200,10",
            "4,10,BBB,SELL,LIMIT,0,200,NEW,EXECUTED,5,200,11",
            "6,12,BBB,SELL,LIMIT,1,300,NEW,PENDING,0,0,0",
        ]
    );
}

#[derive(Debug)]
struct Row {
    timestamp: u64,
    order_id: i64,
    status: String,
    executed_quantity: u64,
    execution_price: String,
    counterparty_id: i64,
}

fn parse_rows(lines: &[String]) -> Vec<Row> {
    lines
        .iter()
        .map(|line| {
            let cols: Vec<&str> = line.split(',').collect();
            Row {
                timestamp: cols[0].parse().unwrap(),
                order_id: cols[1].parse().unwrap(),
                status: cols[8].to_string(),
                executed_quantity: cols[9].parse().unwrap(),
                execution_price: cols[10].to_string(),
                counterparty_id: cols[11].parse().unwrap(),
            }
        })
        .collect()
}

#[test]
fn test_quantity_conservation_and_paired_fills() {
    // A busy single-instrument session mixing fills, cancels and modifies.
    let lines = run_pipeline(&[
        "1,1,X,BUY,LIMIT,50,100,NEW",
        "2,2,X,BUY,LIMIT,30,99,NEW",
        "3,3,X,SELL,LIMIT,20,100,NEW",
        "4,4,X,SELL,LIMIT,40,99,NEW",
        "5,2,X,BUY,LIMIT,30,101,MODIFY",
        "6,5,X,SELL,MARKET,25,,NEW",
        "7,1,X,BUY,LIMIT,50,100,CANCEL",
        "8,6,X,BUY,MARKET,500,,NEW",
    ]);
    let rows = parse_rows(&lines[1..]);

    // Every fill appears exactly twice, with matching trade details and
    // mutual counterparty references.
    let fills: Vec<&Row> = rows
        .iter()
        .filter(|r| r.status == "EXECUTED" || r.status == "PARTIALLY_EXECUTED")
        .filter(|r| r.executed_quantity > 0)
        .collect();
    assert!(!fills.is_empty());
    assert_eq!(fills.len() % 2, 0);
    for pair in fills.chunks(2) {
        let (a, b) = (pair[0], pair[1]);
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.executed_quantity, b.executed_quantity);
        assert_eq!(a.execution_price, b.execution_price);
        assert_eq!(a.counterparty_id, b.order_id);
        assert_eq!(b.counterparty_id, a.order_id);
    }

    // Total executed quantity per order never exceeds its stated quantity.
    let stated: HashMap<i64, u64> =
        [(1, 50), (2, 30), (3, 20), (4, 40), (5, 25), (6, 500)].into();
    let mut executed: HashMap<i64, u64> = HashMap::new();
    for fill in &fills {
        *executed.entry(fill.order_id).or_default() += fill.executed_quantity;
    }
    for (order_id, total) in executed {
        assert!(
            total <= stated[&order_id],
            "order {order_id} executed {total} of {}",
            stated[&order_id]
        );
    }

    // A REJECTED record ends its event: no later record shares its
    // (order_id, timestamp).
    for (index, row) in rows.iter().enumerate() {
        if row.status == "REJECTED" {
            assert!(!rows[index + 1..]
                .iter()
                .any(|r| r.order_id == row.order_id && r.timestamp == row.timestamp));
        }
    }
}

#[test]
fn test_market_orders_never_rest() {
    // The unfilled market remainder must not match against later arrivals.
    let lines = run_pipeline(&[
        "1,1,X,BUY,LIMIT,5,100,NEW",
        "2,2,X,SELL,MARKET,50,,NEW",
        "3,3,X,BUY,LIMIT,5,100,NEW",
    ]);

    assert_eq!(
        lines[1..],
        [
            "1,1,X,BUY,LIMIT,5,100,NEW,PENDING,0,0,0",
            "2,1,X,BUY,LIMIT,0,100,NEW,EXECUTED,5,100,2",
            "2,2,X,SELL,MARKET,45,0,NEW,PARTIALLY_EXECUTED,5,100,1",
            "3,3,X,BUY,LIMIT,5,100,NEW,PENDING,0,0,0",
        ]
    );
}
