use crate::errors::{Error, Result};

use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use std::time::Duration;

const BASE_URL: &str = "https://members-ng.iracing.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const AUTH_COOKIE_NAME: &str = "irsso_membersitev2";

/// Category id of the road discipline, the one the leaderboard ranks on.
pub const ROAD_CATEGORY: i64 = 2;
pub const OVAL_CATEGORY: i64 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct DriverSearchResult {
    pub cust_id: i64,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct License {
    pub category_id: i64,
    pub license_level: i64,
    #[serde(default)]
    pub safety_rating: f64,
    pub irating: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberSummary {
    pub cust_id: i64,
    pub display_name: String,
    #[serde(default)]
    pub licenses: Vec<License>,
}

impl MemberSummary {
    #[inline]
    pub fn license(&self, category_id: i64) -> Option<&License> {
        self.licenses.iter().find(|l| l.category_id == category_id)
    }

    #[inline]
    pub fn road_license(&self) -> Option<&License> {
        self.license(ROAD_CATEGORY)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub track_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentRace {
    pub series_name: String,
    pub track: Track,
    pub start_time: String,
    pub finish_position: i64,
    pub incidents: i64,
}

struct Session {
    http: reqwest::Client,
    cookie: Option<String>,
}

/// Handle on the iracing /data API. The whole session (http client plus auth
/// cookie) sits behind one mutex: iracing rate limits aggressively and the
/// cookie is account wide, so at most one call is in flight at a time and
/// every caller queues behind it.
///
/// All fetch methods degrade to None on any failure. Callers treat missing
/// data as a skippable condition, never as a reason to abort their own cycle.
pub struct IRacingClient {
    email: String,
    password: String,
    session: Mutex<Session>,
}

impl IRacingClient {
    pub fn new(email: String, password: String) -> Result<IRacingClient> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("iracing leaderboard bot")
            .build()?;

        Ok(IRacingClient {
            email,
            password,
            session: Mutex::new(Session { http, cookie: None }),
        })
    }

    async fn authenticate(&self, session: &mut Session) -> Result<()> {
        info!("authenticating against iracing");
        let resp = session
            .http
            .post(format!("{BASE_URL}/auth"))
            .json(&json!({ "email": self.email, "password": self.password }))
            .send()
            .await?
            .error_for_status()?;

        // the service hands the session back as a set-cookie rather than in
        // the response body
        let cookie = resp
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(AUTH_COOKIE_NAME))
            .and_then(|v| v.split(';').next())
            .map(String::from);

        match cookie {
            Some(cookie) => {
                session.cookie = Some(cookie);
                Ok(())
            }
            None => Err(Error::ConstStr("no auth cookie in iracing response")),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        // held for the full request, this is the serialization point
        let mut session = self.session.lock().await;

        if session.cookie.is_none() {
            self.authenticate(&mut session).await?;
        }
        let cookie = match &session.cookie {
            Some(cookie) => cookie.clone(),
            None => return Err(Error::ConstStr("no iracing session cookie")),
        };

        let resp = session
            .http
            .get(format!("{BASE_URL}{path}"))
            .query(query)
            .header(reqwest::header::COOKIE, cookie)
            .send()
            .await?;

        // expired cookie, drop it so the next call logs in again
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            session.cookie = None;
        }

        Ok(resp.error_for_status()?.json::<T>().await?)
    }

    /// Resolve a display name to a customer id. None means no candidate at
    /// all, or the service was unavailable.
    pub async fn search_member(&self, username: &str) -> Option<i64> {
        let results: Vec<DriverSearchResult> = match self
            .get_json("/data/lookup/drivers", &[("search_term", username.to_string())])
            .await
        {
            Ok(results) => results,
            Err(why) => {
                error!("Error searching for member {username}: {why}");
                return None;
            }
        };

        select_candidate(&results, username)
    }

    pub async fn member_summary(&self, cust_id: i64) -> Option<MemberSummary> {
        match self
            .get_json("/data/stats/member_summary", &[("cust_id", cust_id.to_string())])
            .await
        {
            Ok(summary) => Some(summary),
            Err(why) => {
                error!("Error fetching member summary for {cust_id}: {why}");
                None
            }
        }
    }

    pub async fn member_recent_races(&self, cust_id: i64) -> Option<Vec<RecentRace>> {
        match self
            .get_json(
                "/data/stats/member_recent_races",
                &[("cust_id", cust_id.to_string())],
            )
            .await
        {
            Ok(races) => Some(races),
            Err(why) => {
                error!("Error fetching recent races for {cust_id}: {why}");
                None
            }
        }
    }
}

/// Exact case-insensitive name match wins, otherwise fall back to whatever
/// the service returned first.
fn select_candidate(results: &[DriverSearchResult], username: &str) -> Option<i64> {
    if results.is_empty() {
        debug!("no search candidates for {username}");
        return None;
    }
    for candidate in results {
        if candidate.display_name.eq_ignore_ascii_case(username) {
            return Some(candidate.cust_id);
        }
    }
    Some(results[0].cust_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(cust_id: i64, display_name: &str) -> DriverSearchResult {
        DriverSearchResult {
            cust_id,
            display_name: String::from(display_name),
        }
    }

    #[test]
    fn test_select_candidate_prefers_exact_match() {
        let results = vec![
            candidate(1, "Dale Jr Fan"),
            candidate(2, "dale jr"),
            candidate(3, "Dale"),
        ];

        assert_eq!(select_candidate(&results, "Dale Jr"), Some(2));
    }

    #[test]
    fn test_select_candidate_falls_back_to_first() {
        let results = vec![candidate(1, "Dale Jr Fan"), candidate(2, "Dale Sr Fan")];

        assert_eq!(select_candidate(&results, "Dale"), Some(1));
    }

    #[test]
    fn test_select_candidate_empty() {
        assert_eq!(select_candidate(&[], "Dale"), None);
    }

    #[test]
    fn test_road_license_lookup() {
        let summary = MemberSummary {
            cust_id: 1,
            display_name: String::from("Dale Jr"),
            licenses: vec![
                License {
                    category_id: OVAL_CATEGORY,
                    license_level: 10,
                    safety_rating: 3.5,
                    irating: Some(2000),
                },
                License {
                    category_id: ROAD_CATEGORY,
                    license_level: 12,
                    safety_rating: 2.9,
                    irating: Some(1500),
                },
            ],
        };

        assert_eq!(summary.road_license().unwrap().irating, Some(1500));
        assert!(summary.license(3).is_none());
    }
}
