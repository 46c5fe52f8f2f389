mod channel;
mod link;
mod stats;

use crate::errors::Result;
use crate::iracing::{IRacingClient, License};
use crate::leaderboard::license_class;
use crate::structs::reply::{Reply, ReplyType};

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serenity::{model::channel::Message, prelude::*};

// "!irb "
const PREFIX_LEN: usize = 5;

pub(super) const NO_PERMISSION: &str = "You need the Manage Server permission to do that.";

const USAGE: &str = "Commands:
`!irb link <iracing name> [@member]` — link an iRacing account
`!irb unlink [@member]` — remove a link
`!irb links` — list all linked accounts
`!irb stats [iracing name]` — licenses and recent races
`!irb leaderboard [global]` — current road standings
`!irb statschannel [off]` — host the auto-updating leaderboard here
`!irb update` — refresh the leaderboard now";

pub(super) fn has_command_prefix(command: &str) -> bool {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?i)^!irb ").unwrap();
    }
    RE.is_match(command)
}

/// Drop discord mention tokens from an argument string, the mentioned users
/// come in separately on the message itself.
pub(super) fn strip_mentions(args: &str) -> String {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"<@!?\d+>").unwrap();
    }
    RE.replace_all(args, "").trim().to_string()
}

/// True if the invoking member carries Manage Server. Checked before any
/// privileged mutation.
pub(super) async fn is_admin(ctx: &Context, msg: &Message) -> Result<bool> {
    let guild_id = match msg.guild_id {
        Some(guild_id) => guild_id,
        None => return Ok(false),
    };
    let member = guild_id.member(ctx, msg.author.id).await?;
    let perms = member.permissions(&ctx.cache)?;
    Ok(perms.manage_guild())
}

pub(super) fn format_license(license: &License) -> String {
    let irating = license
        .irating
        .map_or_else(|| String::from("N/A"), |ir| ir.to_string());
    format!(
        "Class {} | SR {:.2} | {} iR",
        license_class(license.license_level),
        license.safety_rating,
        irating
    )
}

pub async fn handle_command<'a>(
    ctx: &Context,
    msg: &'a Message,
    iracing: &IRacingClient,
) -> Option<Reply<'a>> {
    if msg.content.len() <= PREFIX_LEN || !has_command_prefix(&msg.content) {
        return None;
    }

    let command = msg.content[PREFIX_LEN..].trim();
    let (subcommand, args) = match command.split_once(' ') {
        Some((subcommand, args)) => (subcommand, args.trim()),
        None => (command, ""),
    };

    let ret = match (subcommand.to_lowercase().as_str(), args) {
        ("link", args) if !args.is_empty() => link::link(ctx, msg, iracing, args).await,
        ("unlink", _) => link::unlink(ctx, msg).await,
        ("links", "") => link::list_links(ctx, msg).await,
        ("stats", args) => stats::stats(ctx, msg, iracing, args).await,
        ("leaderboard", "") => stats::leaderboard(ctx, msg, iracing, false).await,
        ("leaderboard", "global") => stats::leaderboard(ctx, msg, iracing, true).await,
        ("statschannel", "") => channel::enable_stats_channel(ctx, msg, iracing).await,
        ("statschannel", "off") => channel::disable_stats_channel(ctx, msg).await,
        ("update", "") => channel::update_now(ctx, msg, iracing).await,
        _ => Ok(Reply::new_const(USAGE, ReplyType::Message(msg))),
    };

    match ret {
        Ok(resp) => Some(resp),
        Err(why) => {
            warn!("Failed to process command {command} with err: {why}");
            Some(Reply::new_const(
                "Something went wrong, try again later.",
                ReplyType::Message(msg),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iracing::ROAD_CATEGORY;

    #[test]
    fn test_command_prefix() {
        assert!(has_command_prefix("!irb link Dale Jr"));
        assert!(has_command_prefix("!irb leaderboard"));
        assert!(has_command_prefix("!IRB links"));
    }

    #[test]
    fn test_command_prefix_not_start() {
        assert!(!has_command_prefix("   !irb link"));
    }

    #[test]
    fn test_command_prefix_no_exclaimation() {
        assert!(!has_command_prefix("irb link"));
    }

    #[test]
    fn test_command_prefix_non_command() {
        assert!(!has_command_prefix(""));
        assert!(!has_command_prefix("!"));
        assert!(!has_command_prefix("hello world!"));
    }

    #[test]
    fn test_strip_mentions() {
        assert_eq!(strip_mentions("Dale Jr <@123456>"), "Dale Jr");
        assert_eq!(strip_mentions("<@!123456> Dale Jr"), "Dale Jr");
        assert_eq!(strip_mentions("Dale Jr"), "Dale Jr");
        assert_eq!(strip_mentions("<@123>"), "");
    }

    #[test]
    fn test_format_license() {
        let license = License {
            category_id: ROAD_CATEGORY,
            license_level: 1,
            safety_rating: 3.456,
            irating: Some(1820),
        };
        assert_eq!(format_license(&license), "Class B | SR 3.46 | 1820 iR");
    }

    #[test]
    fn test_format_license_no_irating() {
        let license = License {
            category_id: ROAD_CATEGORY,
            license_level: 0,
            safety_rating: 2.5,
            irating: None,
        };
        assert_eq!(format_license(&license), "Class A | SR 2.50 | N/A iR");
    }
}
