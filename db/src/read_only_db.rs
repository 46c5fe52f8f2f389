use crate::connections::GetConnectionImmutable;
use crate::queries;
use crate::structs::{AccountLink, StatsChannel};

use rusqlite::{OptionalExtension, Result};
use serenity::model::id::{GuildId, UserId};

pub trait ReadOnlyDb: GetConnectionImmutable {
    #[inline]
    fn get_link(&self, user_id: UserId) -> Result<Option<AccountLink>> {
        queries::get_link(self.get_connection(), *user_id.as_u64())
    }

    /// All links, oldest first. The leaderboard builder relies on this
    /// ordering to break rating ties deterministically.
    #[inline]
    fn get_all_links(&self) -> Result<Vec<AccountLink>> {
        let mut stmt = self.get_connection().prepare(
            "SELECT user_id, username, customer_id, created_at
            FROM account_link
            ORDER BY created_at, user_id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(AccountLink {
                user: row.get(0)?,
                username: row.get(1)?,
                customer_id: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        let mut links = Vec::new();
        for row in rows {
            links.push(row?)
        }
        Ok(links)
    }

    #[inline]
    fn get_stats_channel(&self, guild_id: GuildId) -> Result<Option<StatsChannel>> {
        self.get_connection()
            .query_row(
                "SELECT guild_id, channel, message, updated_at
                FROM stats_channel
                WHERE guild_id=(?1) AND channel IS NOT NULL",
                [*guild_id.as_u64()],
                |row| {
                    Ok(StatsChannel {
                        guild: row.get(0)?,
                        channel: row.get(1)?,
                        message: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()
    }

    /// Only destinations with a channel set, i.e. the ones the scheduler
    /// should actually post into.
    #[inline]
    fn get_all_stats_channels(&self) -> Result<Vec<StatsChannel>> {
        let mut stmt = self.get_connection().prepare(
            "SELECT guild_id, channel, message, updated_at
            FROM stats_channel
            WHERE channel IS NOT NULL",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(StatsChannel {
                guild: row.get(0)?,
                channel: row.get(1)?,
                message: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;

        let mut channels = Vec::new();
        for row in rows {
            channels.push(row?)
        }
        Ok(channels)
    }
}
