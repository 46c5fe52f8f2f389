#![warn(
    clippy::cognitive_complexity,
    clippy::missing_const_for_fn,
    clippy::option_if_let_else
)]

mod errors;
mod handler;
mod iracing;
mod leaderboard;
mod publisher;
mod scheduler;
mod structs;

use log::LevelFilter;
use log::{error, info};
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use simple_logger::SimpleLogger;
use time::UtcOffset;

use std::env;
use std::process;

use handler::Handler;
use iracing::IRacingClient;

fn migrate_db() {
    match db::migrate() {
        Ok(_) => info!("sucessfully loaded and migrated db"),
        Err(why) => {
            error!("Failed to migrate, exiting {why:?}");
            process::exit(-1);
        }
    };
}

/// Missing credentials are a startup failure, not something to limp along
/// without.
fn required_env(name: &str) -> String {
    match env::var(name) {
        Ok(val) => val,
        Err(_) => {
            error!("{name} not set in the environment, exiting");
            process::exit(-1);
        }
    }
}

#[tokio::main]
async fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("bot", LevelFilter::Debug)
        .with_module_level("db", LevelFilter::Debug)
        // EST offset, will be incorrect if it runs over DST
        // Could we please abolish DST
        .with_utc_offset(UtcOffset::from_hms(-4, 0, 0).unwrap())
        .init()
        .unwrap();

    let token = required_env("DISCORD_TOKEN");
    let iracing_email = required_env("IRACING_EMAIL");
    let iracing_password = required_env("IRACING_PASSWORD");

    // migrate the db
    migrate_db();

    let iracing = match IRacingClient::new(iracing_email, iracing_password) {
        Ok(client) => client,
        Err(why) => {
            error!("Failed to build iracing client, exiting {why:?}");
            process::exit(-1);
        }
    };

    let intents = GatewayIntents::GUILDS
        .union(GatewayIntents::GUILD_MEMBERS)
        .union(GatewayIntents::GUILD_MESSAGES)
        .union(GatewayIntents::MESSAGE_CONTENT);

    let mut client = Client::builder(&token, intents)
        .event_handler(Handler::new(iracing))
        .await
        .expect("Err creating client");

    // Finally, start a single shard, and start listening to events.
    //
    // Shards will automatically attempt to reconnect, and will perform
    // exponential backoff until it reconnects.
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }
}
