use super::{is_admin, NO_PERMISSION};
use crate::errors::Result;
use crate::iracing::IRacingClient;
use crate::scheduler;
use crate::structs::reply::{Reply, ReplyType};

use db::{read_only_db_call, writable_db_call, ReadOnlyDb, WriteableDb};
use serenity::{model::channel::Message, prelude::*};

/// `statschannel` — make the current channel host the auto-updating
/// leaderboard, then paint it immediately rather than waiting for the timer.
pub async fn enable_stats_channel<'a>(
    ctx: &Context,
    msg: &'a Message,
    iracing: &IRacingClient,
) -> Result<Reply<'a>> {
    if !is_admin(ctx, msg).await? {
        return Ok(Reply::new_const(NO_PERMISSION, ReplyType::Message(msg)));
    }

    let guild_id = msg.guild_id.unwrap();
    writable_db_call(|db| db.set_stats_channel(guild_id, msg.channel_id))?;

    if let Some(chan) = read_only_db_call(|db| db.get_stats_channel(guild_id))? {
        scheduler::refresh_channel(ctx, iracing, &chan).await?;
    }

    Ok(Reply::new_const(
        "This channel now hosts the leaderboard, refreshing every 30 minutes.",
        ReplyType::Message(msg),
    ))
}

/// `statschannel off` — stop posting for this guild. The current message is
/// left behind; the tracked reference dies with the config row.
pub async fn disable_stats_channel<'a>(ctx: &Context, msg: &'a Message) -> Result<Reply<'a>> {
    if !is_admin(ctx, msg).await? {
        return Ok(Reply::new_const(NO_PERMISSION, ReplyType::Message(msg)));
    }

    let removed = writable_db_call(|db| db.remove_stats_channel(msg.guild_id.unwrap()))?;
    if removed {
        Ok(Reply::new_const(
            "Leaderboard posting disabled for this server.",
            ReplyType::Message(msg),
        ))
    } else {
        Ok(Reply::new_const(
            "No stats channel was configured for this server.",
            ReplyType::Message(msg),
        ))
    }
}

/// `update` — manual refresh, same routine the timer runs.
pub async fn update_now<'a>(
    ctx: &Context,
    msg: &'a Message,
    iracing: &IRacingClient,
) -> Result<Reply<'a>> {
    if !is_admin(ctx, msg).await? {
        return Ok(Reply::new_const(NO_PERMISSION, ReplyType::Message(msg)));
    }

    match read_only_db_call(|db| db.get_stats_channel(msg.guild_id.unwrap()))? {
        Some(chan) => {
            scheduler::refresh_channel(ctx, iracing, &chan).await?;
            Ok(Reply::new_const(
                "Leaderboard refreshed.",
                ReplyType::Message(msg),
            ))
        }
        None => Ok(Reply::new_const(
            "No stats channel configured for this server, use `!irb statschannel` first.",
            ReplyType::Message(msg),
        )),
    }
}
