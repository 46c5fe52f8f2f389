use super::queries;
use log::{info, trace};

use rusqlite::{Connection, Result};

macro_rules! migration {
    ( $n:literal, $( $x:literal ),* ) => {
        paste::item! {
            fn [< migration_$n >] (conn: &Connection) -> Result<()> {
                trace!("running migration {}", $n);

                $(
                    conn.execute($x, [])?;
                )*
                queries::set_version(conn, $n)?;
                trace!("finished migration {}", $n);
                Ok(())
            }
        }
    };
}

migration![
    1,
    // one row per linked discord user, overwritten on re-link
    "CREATE TABLE account_link (
        user_id INTEGER PRIMARY KEY,
        username TEXT NOT NULL,
        customer_id INTEGER DEFAULT NULL,
        created_at NUMERIC NOT NULL
    );",
    // per guild leaderboard destination, message is the currently tracked post
    "CREATE TABLE stats_channel (
        guild_id INTEGER PRIMARY KEY,
        channel INTEGER DEFAULT NULL,
        message INTEGER DEFAULT NULL,
        updated_at NUMERIC NOT NULL
    );",
    "CREATE INDEX idx_account_link ON account_link (customer_id);"
];

pub fn migrate(conn: &mut Connection) -> Result<()> {
    // be sure to increment this everytime a new migration is added
    const FINAL_VER: u32 = 1;

    let ver = queries::get_version(conn)?;
    info!("database version is currently: {ver} with target ver {FINAL_VER}");
    if ver == FINAL_VER {
        return Ok(());
    }
    trace!("disabling foreign keys pre-migration");
    conn.pragma_update(None, "foreign_keys", "OFF")?;

    let tx = conn.transaction()?;

    trace!("starting migration transaction");

    if ver < 1 {
        migration_1(&tx)?;
    }

    trace!("commiting migration transaction");
    tx.commit()?;
    trace!("successfully commited migration transaction");

    conn.pragma_update(None, "foreign_keys", "ON")?;
    trace!("enabling foreign keys post-migration");
    info!("migration successful");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;
    use std::cmp::{Eq, PartialEq};
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct ColumnInfo {
        pub name: String,
        pub type_name: String,
        pub notnull: usize,
        pub default: Option<String>,
        pub pk: usize,
    }

    struct Table {
        pub rows: HashMap<String, ColumnInfo>,
    }

    impl Table {
        fn assert_row(
            &self,
            name: &str,
            type_name: &str,
            notnull: usize,
            default: Option<&str>,
            pk: usize,
        ) {
            assert_eq!(
                &ColumnInfo {
                    name: String::from(name),
                    type_name: String::from(type_name),
                    notnull,
                    default: default.map(String::from),
                    pk,
                },
                self.rows.get(name).unwrap()
            );
        }
    }

    fn get_migrated_db() -> Result<Connection> {
        let mut conn = Connection::open_in_memory()?;
        migrate(&mut conn)?;
        Ok(conn)
    }

    fn get_table_info(table_name: &str) -> Result<Table> {
        let conn = get_migrated_db()?;
        let mut stmt = conn.prepare("SELECT * FROM pragma_table_info(?1);")?;
        let rows = stmt.query_map(params![table_name], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                type_name: row.get(2)?,
                notnull: row.get(3)?,
                default: row.get(4)?,
                pk: row.get(5)?,
            })
        })?;

        let mut m = HashMap::new();
        for row in rows {
            let info = row?;
            m.insert(info.name.clone(), info);
        }
        Ok(Table { rows: m })
    }

    #[test]
    fn test_account_link_table() -> Result<()> {
        let table = get_table_info("account_link")?;

        assert_eq!(table.rows.len(), 4);
        table.assert_row("user_id", "INTEGER", 0, None, 1);
        table.assert_row("username", "TEXT", 1, None, 0);
        table.assert_row("customer_id", "INTEGER", 0, Some("NULL"), 0);
        table.assert_row("created_at", "NUMERIC", 1, None, 0);

        Ok(())
    }

    #[test]
    fn test_stats_channel_table() -> Result<()> {
        let table = get_table_info("stats_channel")?;

        assert_eq!(table.rows.len(), 4);
        table.assert_row("guild_id", "INTEGER", 0, None, 1);
        table.assert_row("channel", "INTEGER", 0, Some("NULL"), 0);
        table.assert_row("message", "INTEGER", 0, Some("NULL"), 0);
        table.assert_row("updated_at", "NUMERIC", 1, None, 0);

        Ok(())
    }

    #[test]
    fn test_migrate_idempotent() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        migrate(&mut conn)?;
        // running against an already current db must be a no-op
        migrate(&mut conn)?;
        assert_eq!(queries::get_version(&conn)?, 1);
        Ok(())
    }
}
