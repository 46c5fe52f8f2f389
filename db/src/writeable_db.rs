use crate::connections::GetConnectionImmutable;
use crate::ReadOnlyDb;

use chrono::Utc;
use log::{debug, info};
use rusqlite::Result;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};

pub trait WriteableDb: GetConnectionImmutable + ReadOnlyDb {
    /// Upsert by user id. Re-linking overwrites the username and customer id
    /// in place, the original created_at is kept so tie ordering is stable
    /// across re-links.
    #[inline]
    fn upsert_link(
        &self,
        user_id: UserId,
        username: &str,
        customer_id: Option<i64>,
    ) -> Result<()> {
        let mut stmt = self.get_connection().prepare(
            "INSERT INTO account_link (user_id, username, customer_id, created_at)
            VALUES ( ?1, ?2, ?3, ?4 )
            ON CONFLICT(user_id) DO UPDATE SET
                username=excluded.username,
                customer_id=excluded.customer_id",
        )?;

        stmt.execute((*user_id.as_u64(), username, customer_id, Utc::now()))?;
        info!("linked user {user_id} to {username} (cust_id {customer_id:?})");

        Ok(())
    }

    /// Returns false if there was no link to remove.
    #[inline]
    fn remove_link(&self, user_id: UserId) -> Result<bool> {
        let count = self.get_connection().execute(
            "DELETE FROM account_link WHERE user_id=(?1)",
            [*user_id.as_u64()],
        )?;

        if count > 0 {
            info!("unlinked user {user_id}");
        }
        Ok(count > 0)
    }

    /// Enable (or re-point) leaderboard posting for a guild. Pointing at a
    /// new channel drops the tracked message, the old post is unreachable
    /// for editing anyways.
    #[inline]
    fn set_stats_channel(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<()> {
        let mut stmt = self.get_connection().prepare(
            "INSERT INTO stats_channel (guild_id, channel, message, updated_at)
            VALUES ( ?1, ?2, NULL, ?3 )
            ON CONFLICT(guild_id) DO UPDATE SET
                channel=excluded.channel,
                message=NULL,
                updated_at=excluded.updated_at",
        )?;

        stmt.execute((*guild_id.as_u64(), *channel_id.as_u64(), Utc::now()))?;
        info!("stats channel for guild {guild_id} set to {channel_id}");

        Ok(())
    }

    /// Returns false if the guild had no stats channel configured.
    #[inline]
    fn remove_stats_channel(&self, guild_id: GuildId) -> Result<bool> {
        let count = self.get_connection().execute(
            "DELETE FROM stats_channel WHERE guild_id=(?1)",
            [*guild_id.as_u64()],
        )?;

        if count > 0 {
            info!("stats channel for guild {guild_id} removed");
        }
        Ok(count > 0)
    }

    #[inline]
    fn set_stats_message(&self, guild_id: GuildId, message_id: Option<MessageId>) -> Result<()> {
        debug!("tracking stats message {message_id:?} for guild {guild_id}");
        self.execute(
            "UPDATE stats_channel SET message=(?2), updated_at=(?3) WHERE guild_id=(?1)",
            (
                *guild_id.as_u64(),
                message_id.map(|id| *id.as_u64()),
                Utc::now(),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_test_db;

    #[test]
    fn test_link_roundtrip() -> Result<()> {
        let db = open_test_db()?;

        db.upsert_link(UserId(1), "Dale Jr", Some(444555))?;
        let link = db.get_link(UserId(1))?.unwrap();

        assert_eq!(link.user, 1);
        assert_eq!(link.username, "Dale Jr");
        assert_eq!(link.customer_id, Some(444555));
        Ok(())
    }

    #[test]
    fn test_relink_overwrites() -> Result<()> {
        let db = open_test_db()?;

        db.upsert_link(UserId(1), "Dale Jr", Some(444555))?;
        db.upsert_link(UserId(1), "Dale Sr", Some(111222))?;
        db.upsert_link(UserId(1), "Dale Sr", None)?;

        let links = db.get_all_links()?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].username, "Dale Sr");
        assert_eq!(links[0].customer_id, None);
        Ok(())
    }

    #[test]
    fn test_remove_link() -> Result<()> {
        let db = open_test_db()?;

        db.upsert_link(UserId(1), "Dale Jr", Some(444555))?;
        assert!(db.remove_link(UserId(1))?);
        assert!(db.get_link(UserId(1))?.is_none());
        Ok(())
    }

    #[test]
    fn test_remove_missing_link_is_noop() -> Result<()> {
        let db = open_test_db()?;

        db.upsert_link(UserId(1), "Dale Jr", None)?;
        assert!(!db.remove_link(UserId(42))?);
        assert_eq!(db.get_all_links()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_all_links_ordered_by_creation() -> Result<()> {
        let db = open_test_db()?;

        db.upsert_link(UserId(3), "Third", None)?;
        db.upsert_link(UserId(1), "First", None)?;
        db.upsert_link(UserId(2), "Second", None)?;

        // identical timestamps fall back to user id ordering
        db.execute("UPDATE account_link SET created_at='2024-01-01 00:00:00'", [])?;

        let users: Vec<u64> = db.get_all_links()?.iter().map(|l| l.user).collect();
        assert_eq!(users, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_stats_channel_roundtrip() -> Result<()> {
        let db = open_test_db()?;

        db.set_stats_channel(GuildId(10), ChannelId(20))?;
        let chan = db.get_stats_channel(GuildId(10))?.unwrap();

        assert_eq!(chan.guild, 10);
        assert_eq!(chan.channel, 20);
        assert_eq!(chan.message, None);
        Ok(())
    }

    #[test]
    fn test_stats_message_tracking() -> Result<()> {
        let db = open_test_db()?;

        db.set_stats_channel(GuildId(10), ChannelId(20))?;
        db.set_stats_message(GuildId(10), Some(MessageId(30)))?;
        assert_eq!(db.get_stats_channel(GuildId(10))?.unwrap().message, Some(30));

        db.set_stats_message(GuildId(10), None)?;
        assert_eq!(db.get_stats_channel(GuildId(10))?.unwrap().message, None);
        Ok(())
    }

    #[test]
    fn test_repoint_clears_tracked_message() -> Result<()> {
        let db = open_test_db()?;

        db.set_stats_channel(GuildId(10), ChannelId(20))?;
        db.set_stats_message(GuildId(10), Some(MessageId(30)))?;
        db.set_stats_channel(GuildId(10), ChannelId(21))?;

        let chan = db.get_stats_channel(GuildId(10))?.unwrap();
        assert_eq!(chan.channel, 21);
        assert_eq!(chan.message, None);

        // still exactly one config for the guild
        assert_eq!(db.get_all_stats_channels()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_remove_stats_channel() -> Result<()> {
        let db = open_test_db()?;

        db.set_stats_channel(GuildId(10), ChannelId(20))?;
        assert!(db.remove_stats_channel(GuildId(10))?);
        assert!(!db.remove_stats_channel(GuildId(10))?);
        assert!(db.get_stats_channel(GuildId(10))?.is_none());
        Ok(())
    }

    #[test]
    fn test_all_stats_channels_skips_unset() -> Result<()> {
        let db = open_test_db()?;

        db.set_stats_channel(GuildId(10), ChannelId(20))?;
        db.set_stats_channel(GuildId(11), ChannelId(21))?;
        db.execute("UPDATE stats_channel SET channel=NULL WHERE guild_id=11", [])?;

        let channels = db.get_all_stats_channels()?;
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].guild, 10);
        Ok(())
    }
}
