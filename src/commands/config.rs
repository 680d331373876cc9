// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_owner, get_row_cap, pretty_table, set_owner, set_row_cap};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-owner", sub)) => {
            let owner = sub.get_one::<String>("owner").unwrap();
            set_owner(conn, owner)?;
            println!("Owner set to {}", owner.trim());
        }
        Some(("set-row-cap", sub)) => {
            let cap = *sub.get_one::<usize>("cap").unwrap();
            set_row_cap(conn, cap)?;
            println!("Form row cap set to {}", cap);
        }
        _ => {
            let rows = vec![
                vec!["owner_id".to_string(), get_owner(conn)?],
                vec!["row_cap".to_string(), get_row_cap(conn)?.to_string()],
                vec![
                    "database".to_string(),
                    crate::db::db_path()?.display().to_string(),
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
    }
    Ok(())
}
