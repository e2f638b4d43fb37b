use anyhow::Context;
use itertools::Itertools;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK},
    Client, Url,
};
use serde::Deserialize;

use crate::config::Settings;

type Result<T> = anyhow::Result<T>;

pub const PER_PAGE: u32 = 50;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Milestone {
    pub title: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    /// The user's display name. The org issue listing omits `name` for
    /// assignees, so this falls back to `login` instead of printing a blank
    /// assignee column.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.login)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Issue {
    pub title: String,
    pub milestone: Option<Milestone>,
    pub assignee: Option<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub html_url: String,
}

impl Issue {
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.name.as_str())
    }
}

/// Query for https://docs.github.com/en/rest/issues/issues#list-organization-issues-assigned-to-the-authenticated-user
#[derive(Debug, Clone, PartialEq)]
pub struct IssueListOptions {
    pub per_page: u32,
    pub page: Option<u32>,
    pub filter: &'static str,
    pub state: &'static str,
    pub labels: Vec<String>,
}

impl IssueListOptions {
    /// Open issues visible to the token that carry `label`.
    pub fn open_with_label(label: impl Into<String>) -> Self {
        IssueListOptions {
            per_page: PER_PAGE,
            page: None,
            filter: "all",
            state: "open",
            labels: vec![label.into()],
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("per_page", self.per_page.to_string()),
            ("filter", self.filter.to_string()),
            ("state", self.state.to_string()),
            ("labels", self.labels.iter().join(",")),
        ];
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        query
    }
}

/// One page of results. `next_page` is `None` once there are no more pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    pub next_page: Option<u32>,
}

/// Anything that can list an organization's issues page by page.
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    async fn list_by_org(&self, org: &str, opts: &IssueListOptions) -> Result<IssuePage>;
}

pub struct GitHubClient {
    client: Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.token))
            .context("token is not a valid header value")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;
        Ok(GitHubClient {
            client,
            api_url: settings.api_url.clone(),
        })
    }

    fn org_issues_url(&self, org: &str) -> String {
        format!("{}/orgs/{}/issues", self.api_url, org)
    }
}

impl IssueSource for GitHubClient {
    async fn list_by_org(&self, org: &str, opts: &IssueListOptions) -> Result<IssuePage> {
        let resp = self
            .client
            .get(self.org_issues_url(org))
            .query(&opts.query())
            .send()
            .await?
            .error_for_status()?;
        let next_page = resp
            .headers()
            .get(LINK)
            .and_then(|link| link.to_str().ok())
            .and_then(next_page_from_link);
        let issues: Vec<Issue> = resp.json().await?;
        Ok(IssuePage { issues, next_page })
    }
}

/// Matches `rel="next"`, `rel=next` and relation lists such as `rel="next last"`.
fn is_rel_next(param: &str) -> bool {
    let Some((key, value)) = param.split_once('=') else {
        return false;
    };
    key.trim().eq_ignore_ascii_case("rel")
        && value
            .trim()
            .trim_matches('"')
            .split_whitespace()
            .any(|rel| rel.eq_ignore_ascii_case("next"))
}

/// Pull the page number of the `rel="next"` target out of a `Link` header.
pub fn next_page_from_link(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';').map(str::trim);
        let target = parts.next()?;
        if !parts.any(is_rel_next) {
            return None;
        }
        let url = Url::parse(target.strip_prefix('<')?.strip_suffix('>')?).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
