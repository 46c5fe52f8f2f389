mod commands;

use crate::iracing::IRacingClient;
use crate::scheduler;

use log::{error, info};
use serenity::{
    async_trait,
    model::{channel::Message, gateway::Ready},
    prelude::*,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct Handler {
    iracing: Arc<IRacingClient>,
    refresh_loop_running: AtomicBool,
}

impl Handler {
    pub fn new(iracing: IRacingClient) -> Handler {
        Handler {
            iracing: Arc::new(iracing),
            refresh_loop_running: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        // dont care about bot messages
        if msg.author.bot {
            return;
        }

        // commands are guild only, links and stats channels hang off a guild
        if msg.guild_id.is_none() {
            return;
        }

        if let Some(reply) = commands::handle_command(&ctx, &msg, &self.iracing).await {
            if let Err(why) = reply.send(&ctx).await {
                error!("Failed to send command reply: {why}");
            }
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        // ready fires again on reconnect, only one refresh loop per process
        if !self.refresh_loop_running.swap(true, Ordering::SeqCst) {
            let iracing = Arc::clone(&self.iracing);
            tokio::spawn(scheduler::run(ctx, iracing));
        }
    }
}
