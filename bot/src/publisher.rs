use crate::errors::Result;

use db::structs::StatsChannel;
use db::{writable_db_call, WriteableDb};
use log::{error, info, warn};
use serde_json::json;
use serenity::http::error::ErrorResponse;
use serenity::http::HttpError;
use serenity::model::id::MessageId;
use serenity::prelude::*;

/// How far back the purge looks for stale bot posts. Anything older is left
/// behind, best effort only.
const PURGE_WINDOW: u64 = 100;

/// Post-or-edit the tracked leaderboard message for one guild.
///
/// The message reference is only persisted after the remote call succeeded.
/// A crash between post and persist leaves a dangling post behind, which the
/// next cycle cleans up through the not-found path below.
pub async fn publish(ctx: &Context, chan: &StatsChannel, content: &str) -> Result<()> {
    if let Some(message_id) = chan.message_id() {
        match edit_tracked(ctx, chan, message_id, content).await {
            Ok(_) => return Ok(()),
            Err(why) if is_unknown_message(&why) => {
                // tracked message was deleted out from under us, drop the
                // reference and sweep any other stale posts before reposting
                info!(
                    "tracked message {message_id} gone in guild {}, reposting",
                    chan.guild
                );
                writable_db_call(|db| db.set_stats_message(chan.guild_id(), None))?;
                purge_bot_messages(ctx, chan).await;
            }
            Err(why) => return Err(why.into()),
        }
    }

    let posted = chan.channel_id().say(&ctx.http, content).await?;
    writable_db_call(|db| db.set_stats_message(chan.guild_id(), Some(posted.id)))?;
    Ok(())
}

async fn edit_tracked(
    ctx: &Context,
    chan: &StatsChannel,
    message_id: MessageId,
    content: &str,
) -> serenity::Result<()> {
    ctx.http
        .edit_message(
            chan.channel,
            *message_id.as_u64(),
            &json!({ "content": content }),
        )
        .await?;
    Ok(())
}

/// Delete every bot authored message in the recent window so a repost never
/// leaves a second stale leaderboard sitting in the channel. Failures here
/// only cost cosmetics, so they are logged and skipped.
async fn purge_bot_messages(ctx: &Context, chan: &StatsChannel) {
    let messages = match chan
        .channel_id()
        .messages(&ctx.http, |b| b.limit(PURGE_WINDOW))
        .await
    {
        Ok(messages) => messages,
        Err(why) => {
            warn!("failed to fetch messages for purge in {}: {why}", chan.channel);
            return;
        }
    };

    let me = ctx.cache.current_user_id();
    for message in messages.iter().filter(|m| m.author.id == me) {
        if let Err(why) = message.delete(ctx).await {
            error!("failed to purge stale message {}: {why}", message.id);
        }
    }
}

fn is_unknown_message(err: &SerenityError) -> bool {
    if let SerenityError::Http(inner) = err {
        if let HttpError::UnsuccessfulRequest(ErrorResponse { status_code, .. }) = &**inner {
            return *status_code == reqwest::StatusCode::NOT_FOUND;
        }
    }
    false
}
