use crate::authors::CommitEntry;
use crate::issues::IssueRecord;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const API_BASE: &str = "https://api.github.com";
const OWNER: &str = "racket";
const MAIN_BRANCH: &str = "master";
const PER_PAGE: usize = 100;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct GithubClient {
    token: Option<Arc<String>>,
    http: Arc<Client>,
}

impl GithubClient {
    /// Create a GitHub REST client. Requests are authenticated with the
    /// GITHUB_TOKEN env variable when it is set, anonymous otherwise.
    pub fn new() -> Self {
        Self {
            token: std::env::var("GITHUB_TOKEN").ok().map(Arc::new),
            http: Arc::new(Client::new()),
        }
    }

    /// Single GET with the rate-limit policy: a primary rate limit is
    /// retried once after the server-provided delay, a secondary (abuse)
    /// limit is logged and not retried, anything else fails outright.
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let mut retried = false;

        loop {
            let mut req = self
                .http
                .get(url)
                .query(query)
                .header("User-Agent", "repostats")
                .header("Accept", "application/vnd.github+json");
            if let Some(token) = &self.token {
                req = req.bearer_auth(token.as_str());
            }

            let resp = req
                .send()
                .await
                .with_context(|| format!("network error sending GET {url}"))?;

            let status = resp.status();
            if status.is_success() {
                return Ok(resp);
            }

            let headers = resp.headers().clone();
            let body = resp.text().await.unwrap_or_default();

            if is_rate_limited(status.as_u16(), &headers) && !is_secondary_limit(&body) {
                if retried {
                    return Err(anyhow!("GET {url} rate-limited again after one retry"));
                }
                let delay = retry_after(&headers).unwrap_or(DEFAULT_RETRY_DELAY);
                eprintln!(
                    "Request quota exhausted for GET {url}; retrying after {} seconds",
                    delay.as_secs()
                );
                sleep(delay).await;
                retried = true;
                continue;
            }

            if is_secondary_limit(&body) {
                eprintln!("Abuse detection triggered for GET {url}");
            }

            return Err(anyhow!(
                "GitHub API returned HTTP {} for {url}: {body}",
                status.as_u16()
            ));
        }
    }

    /// GET all pages of a list endpoint, advancing `page` until a short page.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{API_BASE}{path}");
        let mut out = Vec::new();
        let mut page = 1usize;

        loop {
            let mut q = query.to_vec();
            q.push(("per_page", PER_PAGE.to_string()));
            q.push(("page", page.to_string()));

            let items: Vec<T> = self
                .get(&url, &q)
                .await?
                .json()
                .await
                .with_context(|| format!("failed to parse JSON from GET {url} page {page}"))?;

            let n = items.len();
            out.extend(items);
            if n < PER_PAGE {
                return Ok(out);
            }
            page += 1;
        }
    }

    /// All issues and pull requests of a repo, any state. Date filtering
    /// happens downstream, not at fetch time.
    pub async fn list_issues(&self, repo: &str) -> Result<Vec<IssueRecord>> {
        #[derive(Deserialize)]
        struct Item {
            created_at: DateTime<Utc>,
            closed_at: Option<DateTime<Utc>>,
            pull_request: Option<serde_json::Value>,
        }

        let items: Vec<Item> = self
            .get_paginated(
                &format!("/repos/{OWNER}/{repo}/issues"),
                &[("state", "all".to_string())],
            )
            .await?;

        Ok(items
            .into_iter()
            .map(|i| IssueRecord {
                created_at: i.created_at,
                closed_at: i.closed_at,
                is_pull_request: i.pull_request.is_some(),
            })
            .collect())
    }

    /// All commits on the main branch at or after `since` (and before
    /// `until` when given), both bounds enforced server-side.
    pub async fn list_commits(
        &self,
        repo: &str,
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<CommitEntry>> {
        #[derive(Deserialize)]
        struct Item {
            sha: String,
            author: Option<User>,
            commit: Detail,
        }
        #[derive(Deserialize)]
        struct User {
            login: String,
        }
        #[derive(Deserialize)]
        struct Detail {
            author: Signature,
            committer: Signature,
        }
        #[derive(Deserialize)]
        struct Signature {
            #[serde(default)]
            name: String,
            #[serde(default)]
            date: Option<DateTime<Utc>>,
        }

        let mut query = vec![
            ("sha", MAIN_BRANCH.to_string()),
            ("since", since.to_rfc3339()),
        ];
        if let Some(until) = until {
            query.push(("until", until.to_rfc3339()));
        }

        let items: Vec<Item> = self
            .get_paginated(&format!("/repos/{OWNER}/{repo}/commits"), &query)
            .await?;

        items
            .into_iter()
            .map(|i| {
                let date = i
                    .commit
                    .committer
                    .date
                    .with_context(|| format!("commit {} has no committer date", i.sha))?;
                Ok(CommitEntry {
                    sha: i.sha,
                    login: i.author.map(|a| a.login),
                    author_name: i.commit.author.name,
                    date,
                })
            })
            .collect()
    }

    /// Number of commits on the main branch within [from, to).
    pub async fn count_commits(
        &self,
        repo: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<usize> {
        #[derive(Deserialize)]
        struct Item {
            #[serde(rename = "sha")]
            _sha: String,
        }

        let items: Vec<Item> = self
            .get_paginated(
                &format!("/repos/{OWNER}/{repo}/commits"),
                &[
                    ("sha", MAIN_BRANCH.to_string()),
                    ("since", from.to_rfc3339()),
                    ("until", to.to_rfc3339()),
                ],
            )
            .await?;

        Ok(items.len())
    }
}

/// Primary rate limit: HTTP 429, or 403 with the quota headers drained.
fn is_rate_limited(status: u16, headers: &HeaderMap) -> bool {
    status == 429
        || (status == 403
            && headers
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                == Some("0"))
}

/// Secondary (abuse) rate limit, signalled in the error body rather than
/// a status of its own.
fn is_secondary_limit(body: &str) -> bool {
    body.contains("secondary rate limit") || body.contains("abuse detection")
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
