// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::rubriques::classify;
use crate::utils::{get_owner, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = check(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn check(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let owner = get_owner(conn)?;
    let mut rows = Vec::new();

    // 1) Account codes no rubrique rule knows about
    let mut stmt = conn.prepare(
        "SELECT DISTINCT account_code FROM journal_entries WHERE owner_id=?1 ORDER BY account_code",
    )?;
    let mut cur = stmt.query([&owner])?;
    while let Some(r) = cur.next()? {
        let code: String = r.get(0)?;
        if classify(&code).is_none() {
            rows.push(vec!["unclassified_account".into(), code]);
        }
    }

    // 2) Deposits flagged on purchases
    let mut stmt2 = conn.prepare(
        "SELECT id, date FROM journal_entries WHERE owner_id=?1 AND is_deposit=1 AND entry_type!='sale'",
    )?;
    let mut cur2 = stmt2.query([&owner])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let d: String = r.get(1)?;
        rows.push(vec!["deposit_on_purchase".into(), format!("#{} {}", id, d)]);
    }

    // 3) Amortization rows whose asset was deleted after posting
    let mut stmt3 = conn.prepare(
        "SELECT m.id, m.year, m.month, m.asset_id FROM amortizations m
         LEFT JOIN assets a ON a.id=m.asset_id
         WHERE m.owner_id=?1 AND m.asset_id IS NOT NULL AND a.id IS NULL",
    )?;
    let mut cur3 = stmt3.query([&owner])?;
    while let Some(r) = cur3.next()? {
        let id: i64 = r.get(0)?;
        let year: i32 = r.get(1)?;
        let month: Option<u32> = r.get(2)?;
        let asset_id: i64 = r.get(3)?;
        let period = month
            .map(|m| crate::models::month_key(year, m))
            .unwrap_or_else(|| year.to_string());
        rows.push(vec![
            "orphan_amortization".into(),
            format!("#{} {} asset {}", id, period, asset_id),
        ]);
    }
    Ok(rows)
}
