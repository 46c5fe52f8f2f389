use crate::structs::AccountLink;
use rusqlite::{Connection, OptionalExtension, Result};

#[inline(always)]
pub fn get_version(conn: &Connection) -> Result<u32> {
    conn.query_row("SELECT user_version FROM pragma_user_version;", [], |row| {
        row.get(0)
    })
}

#[inline(always)]
pub fn set_version(conn: &Connection, version: u32) -> Result<()> {
    conn.pragma_update(None, "user_version", version)
}

#[inline(always)]
pub fn get_link(conn: &Connection, user_id: u64) -> Result<Option<AccountLink>> {
    conn.query_row(
        "SELECT user_id, username, customer_id, created_at
        FROM account_link WHERE user_id=(?1)",
        [user_id],
        |row| {
            Ok(AccountLink {
                user: row.get(0)?,
                username: row.get(1)?,
                customer_id: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )
    .optional()
}
