mod migrations;
mod queries;
mod read_only_db;
pub mod structs;
mod writeable_db;

pub use read_only_db::ReadOnlyDb;
pub use writeable_db::WriteableDb;

use rusqlite::{Connection, OpenFlags, Result};

pub(crate) mod connections {
    use rusqlite::{Connection, Params, Result};

    pub trait GetConnectionImmutable {
        fn get_connection(&self) -> &Connection;

        #[inline(always)]
        fn execute<P: Params>(&self, sql: &str, params: P) -> Result<()> {
            self.get_connection().execute(sql, params)?;
            Ok(())
        }
    }
}

pub struct ReadOnlyConn {
    conn: Connection,
}

impl connections::GetConnectionImmutable for ReadOnlyConn {
    #[inline]
    fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

impl ReadOnlyDb for ReadOnlyConn {}

pub struct WriteableConn {
    conn: Connection,
}

impl connections::GetConnectionImmutable for WriteableConn {
    #[inline]
    fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

impl ReadOnlyDb for WriteableConn {}

impl WriteableDb for WriteableConn {}

const DB_PATH: &str = "./leaderboard.db3";

impl ReadOnlyConn {
    #[inline(always)]
    fn new() -> Result<ReadOnlyConn> {
        Ok(ReadOnlyConn {
            conn: Connection::open_with_flags(DB_PATH, OpenFlags::SQLITE_OPEN_READ_ONLY)?,
        })
    }
}

impl WriteableConn {
    #[inline(always)]
    fn new() -> Result<WriteableConn> {
        Ok(WriteableConn {
            conn: Connection::open(DB_PATH)?,
        })
    }
}

#[inline]
pub fn get_read_only_db() -> Result<impl ReadOnlyDb> {
    ReadOnlyConn::new()
}

#[inline]
pub fn get_writeable_db() -> Result<impl WriteableDb> {
    WriteableConn::new()
}

#[inline]
pub fn migrate() -> Result<()> {
    migrations::migrate(&mut Connection::open(DB_PATH)?)
}

#[inline]
pub fn writable_db_call<F, T>(f: F) -> Result<T>
where
    F: FnOnce(WriteableConn) -> Result<T>,
{
    f(WriteableConn::new()?)
}

#[inline]
pub fn read_only_db_call<F, T>(f: F) -> Result<T>
where
    F: FnOnce(ReadOnlyConn) -> Result<T>,
{
    f(ReadOnlyConn::new()?)
}

#[cfg(test)]
pub(crate) fn open_test_db() -> Result<WriteableConn> {
    let mut conn = Connection::open_in_memory()?;
    migrations::migrate(&mut conn)?;
    Ok(WriteableConn { conn })
}
