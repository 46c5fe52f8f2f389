use crate::errors::Result;
use crate::iracing::IRacingClient;
use crate::leaderboard::{self, Scope};
use crate::publisher;

use db::structs::StatsChannel;
use db::{read_only_db_call, ReadOnlyDb};
use log::{debug, error, info};
use serenity::prelude::*;

use std::sync::Arc;
use std::time::Duration;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Runs for the lifetime of the process, spawned once the gateway is ready.
/// The first tick fires immediately so a restart repaints every guild
/// without waiting out the interval.
pub async fn run(ctx: Context, iracing: Arc<IRacingClient>) {
    let mut timer = tokio::time::interval(REFRESH_INTERVAL);
    info!(
        "leaderboard refresh loop started, interval {}s",
        REFRESH_INTERVAL.as_secs()
    );

    loop {
        timer.tick().await;
        refresh_all(&ctx, &iracing).await;
    }
}

/// One full pass over every configured guild. A failing guild is logged and
/// skipped so it can't take the rest of the pass down with it.
pub async fn refresh_all(ctx: &Context, iracing: &IRacingClient) {
    let channels = match read_only_db_call(|db| db.get_all_stats_channels()) {
        Ok(channels) => channels,
        Err(why) => {
            error!("failed to load stats channels, skipping pass: {why}");
            return;
        }
    };

    debug!("refreshing {} stats channel(s)", channels.len());
    for chan in channels {
        if let Err(why) = refresh_channel(ctx, iracing, &chan).await {
            error!("leaderboard refresh failed for guild {}: {why}", chan.guild);
        }
    }
}

/// Rebuild and republish a single guild's leaderboard. Also the manual
/// trigger entry point, commands call straight into it without touching the
/// timer.
pub async fn refresh_channel(
    ctx: &Context,
    iracing: &IRacingClient,
    chan: &StatsChannel,
) -> Result<()> {
    let lb = leaderboard::build(ctx, iracing, Scope::Guild(chan.guild_id())).await?;
    publisher::publish(ctx, chan, &lb.render()).await
}
