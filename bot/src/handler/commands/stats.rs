use super::{format_license, strip_mentions};
use crate::errors::Result;
use crate::iracing::IRacingClient;
use crate::leaderboard::{self, Scope};
use crate::structs::reply::{Reply, ReplyType};

use db::{read_only_db_call, ReadOnlyDb};
use serenity::{model::channel::Message, prelude::*};

const RECENT_RACE_COUNT: usize = 3;

fn category_name(category_id: i64) -> &'static str {
    match category_id {
        1 => "Oval",
        2 => "Road",
        3 => "Dirt Oval",
        4 => "Dirt Road",
        _ => "Unknown",
    }
}

/// `stats [iracing name]` — licenses plus a few recent races, for the
/// invoker's linked account or an arbitrary searched driver.
pub async fn stats<'a>(
    ctx: &Context,
    msg: &'a Message,
    iracing: &IRacingClient,
    args: &str,
) -> Result<Reply<'a>> {
    let query = strip_mentions(args);

    let cust_id = if query.is_empty() {
        match read_only_db_call(|db| db.get_link(msg.author.id))? {
            Some(link) => match link.customer_id {
                Some(cust_id) => cust_id,
                None => {
                    return Ok(Reply::new_const(
                        "Your link never resolved to an iRacing account, try `!irb link` again.",
                        ReplyType::Message(msg),
                    ))
                }
            },
            None => {
                return Ok(Reply::new_const(
                    "You have not linked an iRacing account. Use `!irb link <name>` first.",
                    ReplyType::Message(msg),
                ))
            }
        }
    } else {
        match iracing.search_member(&query).await {
            Some(cust_id) => cust_id,
            None => {
                return Ok(Reply::new(
                    format!("Could not find iRacing driver: {query}"),
                    ReplyType::Message(msg),
                ))
            }
        }
    };

    let summary = match iracing.member_summary(cust_id).await {
        Some(summary) => summary,
        None => {
            return Ok(Reply::new_const(
                "Could not retrieve iRacing data right now, try again later.",
                ReplyType::Message(msg),
            ))
        }
    };

    let mut response = format!("🏁 **{}** (customer id {cust_id})", summary.display_name);
    for license in &summary.licenses {
        response.push_str(&format!(
            "\n{}: {}",
            category_name(license.category_id),
            format_license(license)
        ));
    }

    if let Some(races) = iracing.member_recent_races(cust_id).await {
        for race in races.iter().take(RECENT_RACE_COUNT) {
            response.push_str(&format!(
                "\n{} @ {} — P{} ({} incidents)",
                race.series_name, race.track.track_name, race.finish_position, race.incidents
            ));
        }
    }

    Ok(Reply::new(response, ReplyType::Channel(msg.channel_id)))
}

/// On demand render of the standings, guild-scoped by default or across
/// every linked account with `global`. Plain command output, the tracked
/// stats channel message is untouched.
pub async fn leaderboard<'a>(
    ctx: &Context,
    msg: &'a Message,
    iracing: &IRacingClient,
    global: bool,
) -> Result<Reply<'a>> {
    let scope = if global {
        Scope::Global
    } else {
        Scope::Guild(msg.guild_id.unwrap())
    };

    let lb = leaderboard::build(ctx, iracing, scope).await?;
    Ok(Reply::new(lb.render(), ReplyType::Channel(msg.channel_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(category_name(1), "Oval");
        assert_eq!(category_name(2), "Road");
        assert_eq!(category_name(4), "Dirt Road");
        assert_eq!(category_name(99), "Unknown");
    }
}
