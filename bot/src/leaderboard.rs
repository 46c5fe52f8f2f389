use crate::errors::Result;
use crate::iracing::IRacingClient;

use chrono::Utc;
use db::{read_only_db_call, ReadOnlyDb};
use log::debug;
use serenity::model::id::GuildId;
use serenity::prelude::*;

use std::cmp::Reverse;

/// Rendered rows are capped at this no matter how many accounts qualify.
pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, Copy)]
pub enum Scope {
    Global,
    Guild(GuildId),
}

#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub user: u64,
    pub username: String,
    pub irating: i64,
    pub safety_rating: f64,
    pub license_level: i64,
}

#[derive(Debug)]
pub struct Leaderboard {
    /// Raw number of links in scope, before any of them were dropped for
    /// missing data. Zero means nobody has linked at all, which renders
    /// differently from "linked but nothing ranked yet".
    pub linked: usize,
    pub entries: Vec<LeaderboardEntry>,
}

/// Fan out over every link in scope and pull current stats through the
/// gateway. One serialized iracing call per linked account, so a full build
/// costs O(N) gateway latencies; the refresh interval has to stay well above
/// that. Accounts that are unresolved, unavailable or have no road rating
/// are skipped, never an error.
pub async fn build(ctx: &Context, iracing: &IRacingClient, scope: Scope) -> Result<Leaderboard> {
    let links = read_only_db_call(|db| db.get_all_links())?;

    let mut in_scope = Vec::new();
    for link in links {
        let keep = match scope {
            Scope::Global => true,
            Scope::Guild(guild_id) => is_member(ctx, guild_id, link.user).await,
        };
        if keep {
            in_scope.push(link);
        }
    }
    let linked = in_scope.len();

    let mut entries = Vec::new();
    for link in in_scope {
        let cust_id = match link.customer_id {
            Some(cust_id) => cust_id,
            None => {
                debug!("skipping {}: no resolved customer id", link.username);
                continue;
            }
        };

        let summary = match iracing.member_summary(cust_id).await {
            Some(summary) => summary,
            None => continue,
        };

        let road = match summary.road_license() {
            Some(license) => license.clone(),
            None => {
                debug!("skipping {}: no road license", link.username);
                continue;
            }
        };

        if let Some(irating) = road.irating {
            entries.push(LeaderboardEntry {
                user: link.user,
                username: link.username,
                irating,
                safety_rating: road.safety_rating,
                license_level: road.license_level,
            });
        }
    }

    rank(&mut entries);
    Ok(Leaderboard { linked, entries })
}

async fn is_member(ctx: &Context, guild_id: GuildId, user: u64) -> bool {
    guild_id.member(&ctx.http, user).await.is_ok()
}

/// Descending by irating. Stable, so ties keep the link store's iteration
/// order (oldest link first).
fn rank(entries: &mut [LeaderboardEntry]) {
    entries.sort_by_key(|e| Reverse(e.irating));
}

/// License levels come back as a ladder index, class letters start at A.
pub fn license_class(license_level: i64) -> String {
    match u8::try_from(license_level) {
        Ok(level) if level < 26 => char::from(b'A' + level).to_string(),
        _ => String::from("?"),
    }
}

impl Leaderboard {
    pub fn render(&self) -> String {
        let mut out = String::from("🏁 **iRacing Road Leaderboard**\n\n");

        if self.linked == 0 {
            out.push_str("No linked accounts yet. Use `!irb link <name>` to join the standings.\n");
        } else if self.entries.is_empty() {
            out.push_str("No ranked data available for any linked account right now.\n");
        } else {
            for (i, entry) in self.entries.iter().take(LEADERBOARD_SIZE).enumerate() {
                out.push_str(&format!(
                    "{}. **{}** — {} iR | SR {:.2} | Class {}\n",
                    i + 1,
                    entry.username,
                    entry.irating,
                    entry.safety_rating,
                    license_class(entry.license_level)
                ));
            }
        }

        out.push_str(&format!(
            "\n_Updated {} • refreshes every 30 minutes_",
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: u64, username: &str, irating: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            user,
            username: String::from(username),
            irating,
            safety_rating: 3.0,
            license_level: 2,
        }
    }

    #[test]
    fn test_rank_descending() {
        let mut entries = vec![entry(1, "a", 1500), entry(2, "b", 1800), entry(3, "c", 1650)];
        rank(&mut entries);

        let ratings: Vec<i64> = entries.iter().map(|e| e.irating).collect();
        assert_eq!(ratings, vec![1800, 1650, 1500]);
    }

    #[test]
    fn test_rank_ties_keep_iteration_order() {
        let mut entries = vec![
            entry(1, "first", 1500),
            entry(2, "second", 1500),
            entry(3, "third", 1800),
        ];
        rank(&mut entries);

        let users: Vec<u64> = entries.iter().map(|e| e.user).collect();
        assert_eq!(users, vec![3, 1, 2]);
    }

    #[test]
    fn test_render_truncates_to_top_ten() {
        let mut entries: Vec<LeaderboardEntry> = (0..15)
            .map(|i| entry(i, &format!("driver{i}"), 2000 - i as i64 * 10))
            .collect();
        rank(&mut entries);
        let lb = Leaderboard { linked: 15, entries };

        let rendered = lb.render();
        let rows = rendered
            .lines()
            .filter(|l| l.contains(" iR |"))
            .collect::<Vec<_>>();

        assert_eq!(rows.len(), LEADERBOARD_SIZE);
        // the ten highest rated survive the cut
        assert!(rendered.contains("driver0"));
        assert!(rendered.contains("driver9"));
        assert!(!rendered.contains("driver10"));
    }

    #[test]
    fn test_render_no_linked_accounts() {
        let lb = Leaderboard {
            linked: 0,
            entries: Vec::new(),
        };
        assert!(lb.render().contains("No linked accounts yet"));
    }

    #[test]
    fn test_render_links_without_ranked_data() {
        let lb = Leaderboard {
            linked: 3,
            entries: Vec::new(),
        };

        let rendered = lb.render();
        assert!(rendered.contains("No ranked data available"));
        assert!(!rendered.contains("No linked accounts yet"));
    }

    #[test]
    fn test_license_class() {
        assert_eq!(license_class(0), "A");
        assert_eq!(license_class(3), "D");
        assert_eq!(license_class(-1), "?");
        assert_eq!(license_class(99), "?");
    }
}
