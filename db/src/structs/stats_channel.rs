use chrono::{DateTime, Utc};
use serenity::model::id::{ChannelId, GuildId, MessageId};

/// Per guild leaderboard destination. `message` points at the post the bot
/// currently keeps edited in place, None until the first successful post or
/// after the tracked post was found deleted.
#[derive(Debug, Clone)]
pub struct StatsChannel {
    pub guild: u64,
    pub channel: u64,
    pub message: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

impl StatsChannel {
    #[inline(always)]
    pub const fn guild_id(&self) -> GuildId {
        GuildId(self.guild)
    }

    #[inline(always)]
    pub const fn channel_id(&self) -> ChannelId {
        ChannelId(self.channel)
    }

    #[inline(always)]
    pub fn message_id(&self) -> Option<MessageId> {
        self.message.map(MessageId)
    }
}
