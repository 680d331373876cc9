// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_owner, id_for_property, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let owner = get_owner(conn)?;
    match m.subcommand() {
        Some(("set", sub)) => {
            let property = sub.get_one::<String>("property").unwrap();
            let property_id = id_for_property(conn, &owner, property)?;
            let category = sub.get_one::<String>("category").unwrap().trim();
            let months = *sub.get_one::<u32>("months").unwrap();
            conn.execute(
                "INSERT INTO amortization_defaults(property_id, category, duration_months) VALUES (?1,?2,?3)
                 ON CONFLICT(property_id, category) DO UPDATE SET duration_months=excluded.duration_months",
                params![property_id, category, months],
            )?;
            println!(
                "Default for {} / {} = {} months",
                property.trim(),
                category,
                months
            );
        }
        Some(("list", sub)) => {
            let mut sql = String::from(
                "SELECT p.name, d.category, d.duration_months FROM amortization_defaults d
                 JOIN properties p ON d.property_id=p.id WHERE p.owner_id=?1",
            );
            let mut args: Vec<String> = vec![owner.clone()];
            if let Some(name) = sub.get_one::<String>("property") {
                sql.push_str(" AND p.name=?2");
                args.push(name.trim().to_string());
            }
            sql.push_str(" ORDER BY p.name, d.category");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, u32>(2)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (p, c, months) = row?;
                data.push(vec![p, c, months.to_string()]);
            }
            println!(
                "{}",
                pretty_table(&["Property", "Category", "Months"], data)
            );
        }
        _ => {}
    }
    Ok(())
}
