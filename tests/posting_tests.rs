// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use lmnpbook::accounting::monthly::{PostOutcome, PostRequest, PostScope, post_for_month};
use lmnpbook::error::AccountingError;
use lmnpbook::store::{LedgerStore, NewAmortizationPosting, SqliteStore};
use lmnpbook::{cli, commands::amortization, db};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO properties(id, owner_id, name) VALUES (1, 'u1', 'Studio');
        INSERT INTO properties(id, owner_id, name) VALUES (2, 'u1', 'Loft');
        INSERT INTO properties(id, owner_id, name) VALUES (3, 'u2', 'Elsewhere');
        INSERT INTO assets(id, owner_id, property_id, label, amount_ht, duration_years, acquisition_date, account_code)
            VALUES (10, 'u1', 1, 'Kitchen', '12000', 5, '2024-04-15', '2181');
        INSERT INTO assets(id, owner_id, property_id, label, amount_ht, duration_years, acquisition_date, account_code)
            VALUES (11, 'u1', 1, 'Sofa', '1200', 2, '2025-06-01', '2184');
        INSERT INTO assets(id, owner_id, property_id, label, amount_ht, duration_years, acquisition_date, account_code)
            VALUES (12, 'u1', 2, 'Bed', '600', 5, '2023-01-01', '2184');
        INSERT INTO assets(id, owner_id, property_id, label, amount_ht, duration_years, acquisition_date, account_code)
            VALUES (13, 'u2', 3, 'Other', '900', 3, '2023-01-01', '2184');
        "#,
    )
    .unwrap();
    conn
}

fn request(property_id: i64, year: i32, month: u32) -> PostRequest {
    PostRequest {
        owner_id: "u1".into(),
        property_id,
        year,
        month,
        scope: PostScope::Property,
        asset_id: None,
    }
}

fn row_count(conn: &Connection, property_id: i64, year: i32, month: u32) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM amortizations WHERE property_id=?1 AND year=?2 AND month=?3",
        params![property_id, year, month],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn posting_twice_creates_nothing_the_second_time() {
    let conn = setup();
    let store = SqliteStore::new(&conn);

    let first = post_for_month(&store, &request(1, 2025, 3)).unwrap();
    // the sofa is only acquired in June
    assert_eq!(first, PostOutcome { created: 1, skipped: 1 });
    assert_eq!(row_count(&conn, 1, 2025, 3), 1);

    let second = post_for_month(&store, &request(1, 2025, 3)).unwrap();
    assert_eq!(second.created, 0);
    assert!(second.skipped > 0);
    assert_eq!(row_count(&conn, 1, 2025, 3), 1);

    let (amount, note): (String, String) = conn
        .query_row(
            "SELECT amount, note FROM amortizations WHERE asset_id=10",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(amount.parse::<Decimal>().unwrap(), dec!(200));
    assert_eq!(note, "month:2025-03;asset:10");
}

#[test]
fn first_month_is_prorated_when_posting() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let out = post_for_month(&store, &request(1, 2024, 4)).unwrap();
    assert_eq!(out.created, 1);
    let amount: String = conn
        .query_row("SELECT amount FROM amortizations WHERE asset_id=10", [], |r| r.get(0))
        .unwrap();
    assert_eq!(amount.parse::<Decimal>().unwrap(), dec!(106.67));
}

#[test]
fn asset_scope_requires_asset_id() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let mut req = request(1, 2025, 3);
    req.scope = PostScope::Asset;
    let err = post_for_month(&store, &req).unwrap_err();
    assert!(matches!(err, AccountingError::MissingParameter("asset_id")));
}

#[test]
fn asset_scope_rejects_foreign_assets() {
    let conn = setup();
    let store = SqliteStore::new(&conn);

    // asset of another property of the same owner
    let mut req = request(1, 2025, 3);
    req.scope = PostScope::Asset;
    req.asset_id = Some(12);
    assert!(matches!(
        post_for_month(&store, &req).unwrap_err(),
        AccountingError::Forbidden(_)
    ));

    // asset of another owner
    req.asset_id = Some(13);
    assert!(matches!(
        post_for_month(&store, &req).unwrap_err(),
        AccountingError::Forbidden(_)
    ));

    req.asset_id = Some(999);
    assert!(matches!(
        post_for_month(&store, &req).unwrap_err(),
        AccountingError::NotFound(_)
    ));
    assert_eq!(row_count(&conn, 1, 2025, 3), 0);
}

#[test]
fn property_of_another_owner_is_forbidden() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let err = post_for_month(&store, &request(3, 2025, 3)).unwrap_err();
    assert!(matches!(err, AccountingError::Forbidden(_)));
}

#[test]
fn asset_scope_posts_only_that_asset_then_property_skips_it() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let mut req = request(1, 2025, 7);
    req.scope = PostScope::Asset;
    req.asset_id = Some(11);
    assert_eq!(
        post_for_month(&store, &req).unwrap(),
        PostOutcome { created: 1, skipped: 0 }
    );

    let out = post_for_month(&store, &request(1, 2025, 7)).unwrap();
    assert_eq!(out, PostOutcome { created: 1, skipped: 1 });
    assert_eq!(row_count(&conn, 1, 2025, 7), 2);
}

#[test]
fn legacy_note_rows_count_as_posted() {
    let conn = setup();
    conn.execute(
        "INSERT INTO amortizations(owner_id, property_id, year, month, asset_id, amount, note)
         VALUES ('u1', 1, 2025, NULL, NULL, '200', 'month:2025-05;asset:10')",
        [],
    )
    .unwrap();
    let store = SqliteStore::new(&conn);
    let out = post_for_month(&store, &request(1, 2025, 5)).unwrap();
    assert_eq!(out, PostOutcome { created: 0, skipped: 2 });
}

#[test]
fn deleted_assets_report_existing_rows_as_skipped() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    assert_eq!(post_for_month(&store, &request(2, 2025, 1)).unwrap().created, 1);
    conn.execute("DELETE FROM assets WHERE property_id=2", []).unwrap();
    let out = post_for_month(&store, &request(2, 2025, 1)).unwrap();
    assert_eq!(out, PostOutcome { created: 0, skipped: 1 });
}

#[test]
fn store_rejects_duplicate_period_key() {
    // Two callers that both saw "not yet posted" race to insert.
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let row = NewAmortizationPosting {
        owner_id: "u1".into(),
        property_id: 1,
        year: 2025,
        month: Some(2),
        asset_id: Some(10),
        amount: dec!(200),
        note: Some("month:2025-02;asset:10".into()),
    };
    assert!(store.create_amortization_posting(&row).unwrap().is_some());
    assert!(store.create_amortization_posting(&row).unwrap().is_none());
    assert_eq!(row_count(&conn, 1, 2025, 2), 1);

    let out = post_for_month(&store, &request(1, 2025, 2)).unwrap();
    assert_eq!(out.created, 0);
}

#[test]
fn cli_post_rejects_asset_scope_without_asset() {
    let conn = setup();
    conn.execute("INSERT INTO settings(key, value) VALUES('owner_id', 'u1')", [])
        .unwrap();
    let matches = cli::build_cli().get_matches_from([
        "lmnpbook",
        "amortization",
        "post",
        "--property",
        " Studio ",
        "--month",
        "2025-03",
        "--scope",
        "asset",
    ]);
    let Some(("amortization", am)) = matches.subcommand() else {
        panic!("amortization command not parsed");
    };
    let Some(("post", post_m)) = am.subcommand() else {
        panic!("post subcommand not parsed");
    };
    let err = amortization::post(&conn, post_m).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AccountingError>(),
        Some(AccountingError::MissingParameter("asset_id"))
    ));

    let out = cli::build_cli().get_matches_from([
        "lmnpbook",
        "amortization",
        "post",
        "--property",
        "Studio",
        "--month",
        "2025-03",
    ]);
    let Some(("amortization", am)) = out.subcommand() else {
        panic!("amortization command not parsed");
    };
    let Some(("post", post_m)) = am.subcommand() else {
        panic!("post subcommand not parsed");
    };
    assert_eq!(amortization::post(&conn, post_m).unwrap().created, 1);
}
