use super::{format_license, is_admin, strip_mentions, NO_PERMISSION};
use crate::errors::Result;
use crate::iracing::{IRacingClient, OVAL_CATEGORY, ROAD_CATEGORY};
use crate::structs::reply::{Reply, ReplyType};

use db::{read_only_db_call, writable_db_call, ReadOnlyDb, WriteableDb};
use serenity::{model::channel::Message, prelude::*};

/// `link <iracing name> [@member]`. The name is resolved to a customer id up
/// front so the leaderboard never has to search again; a name that can't be
/// resolved (or whose stats can't be fetched) leaves the store untouched.
pub async fn link<'a>(
    ctx: &Context,
    msg: &'a Message,
    iracing: &IRacingClient,
    args: &str,
) -> Result<Reply<'a>> {
    let target = msg.mentions.first().unwrap_or(&msg.author);
    if target.id != msg.author.id && !is_admin(ctx, msg).await? {
        return Ok(Reply::new_const(NO_PERMISSION, ReplyType::Message(msg)));
    }

    let username = strip_mentions(args);
    if username.is_empty() {
        return Ok(Reply::new_const(
            "Usage: `!irb link <iracing name> [@member]`",
            ReplyType::Message(msg),
        ));
    }

    let cust_id = match iracing.search_member(&username).await {
        Some(cust_id) => cust_id,
        None => {
            return Ok(Reply::new(
                format!("Could not find iRacing driver: {username}"),
                ReplyType::Message(msg),
            ))
        }
    };

    let summary = match iracing.member_summary(cust_id).await {
        Some(summary) => summary,
        None => {
            return Ok(Reply::new(
                format!("Could not retrieve data for iRacing driver: {username}"),
                ReplyType::Message(msg),
            ))
        }
    };

    writable_db_call(|db| db.upsert_link(target.id, &username, Some(cust_id)))?;

    let mut response = format!(
        "Linked <@{}> to **{}** (customer id {cust_id})",
        target.id.as_u64(),
        summary.display_name
    );
    for (label, category) in [("Road", ROAD_CATEGORY), ("Oval", OVAL_CATEGORY)] {
        if let Some(license) = summary.license(category) {
            response.push_str(&format!("\n{label}: {}", format_license(license)));
        }
    }

    Ok(Reply::new(response, ReplyType::Message(msg)))
}

/// `unlink [@member]`. Unlinking someone else needs Manage Server; unlinking
/// a user who never linked reports not-found and changes nothing.
pub async fn unlink<'a>(ctx: &Context, msg: &'a Message) -> Result<Reply<'a>> {
    let target = msg.mentions.first().unwrap_or(&msg.author);
    if target.id != msg.author.id && !is_admin(ctx, msg).await? {
        return Ok(Reply::new_const(NO_PERMISSION, ReplyType::Message(msg)));
    }

    let removed = writable_db_call(|db| db.remove_link(target.id))?;
    if removed {
        Ok(Reply::new(
            format!("Unlinked <@{}>.", target.id.as_u64()),
            ReplyType::Message(msg),
        ))
    } else {
        Ok(Reply::new(
            format!("No iRacing account linked for <@{}>.", target.id.as_u64()),
            ReplyType::Message(msg),
        ))
    }
}

pub async fn list_links<'a>(ctx: &Context, msg: &'a Message) -> Result<Reply<'a>> {
    if !is_admin(ctx, msg).await? {
        return Ok(Reply::new_const(NO_PERMISSION, ReplyType::Message(msg)));
    }

    let links = read_only_db_call(|db| db.get_all_links())?;
    if links.is_empty() {
        return Ok(Reply::new_const(
            "No linked accounts.",
            ReplyType::Message(msg),
        ));
    }

    let response = format!(
        "Linked accounts ({})\n{}",
        links.len(),
        links
            .into_iter()
            .map(|l| {
                let cust = l
                    .customer_id
                    .map_or_else(|| String::from("unresolved"), |c| c.to_string());
                format!("<@{}> — {} ({cust})", l.user, l.username)
            })
            .collect::<Vec<String>>()
            .join("\n")
    );

    Ok(Reply::new(response, ReplyType::Channel(msg.channel_id)))
}
