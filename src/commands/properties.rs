// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_owner, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let owner = get_owner(conn)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            if name.is_empty() {
                return Err(anyhow!("Property name must not be empty"));
            }
            conn.execute(
                "INSERT INTO properties(owner_id, name) VALUES (?1, ?2)",
                params![owner, name],
            )?;
            println!("Added property '{}'", name);
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.name, p.created_at,
                        (SELECT COUNT(*) FROM assets a WHERE a.property_id=p.id),
                        (SELECT COUNT(*) FROM journal_entries j WHERE j.property_id=p.id)
                 FROM properties p WHERE p.owner_id=?1 ORDER BY p.name",
            )?;
            let rows = stmt.query_map(params![owner], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, i64>(3)?,
                    r.get::<_, i64>(4)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (id, name, created, assets, entries) = row?;
                data.push(vec![
                    id.to_string(),
                    name,
                    assets.to_string(),
                    entries.to_string(),
                    created,
                ]);
            }
            println!(
                "{}",
                pretty_table(&["ID", "Name", "Assets", "Entries", "Created"], data)
            );
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let n = conn.execute(
                "DELETE FROM properties WHERE owner_id=?1 AND name=?2",
                params![owner, name],
            )?;
            if n == 0 {
                return Err(anyhow!("Property '{}' not found", name));
            }
            println!("Removed property '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
