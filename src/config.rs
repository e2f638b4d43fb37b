use anyhow::bail;
use clap::Parser;

type Result<T> = anyhow::Result<T>;

/// Environment variable holding the GitHub token.
pub const TOKEN_VAR: &str = "GITHUB_AUTH_TOKEN";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Sum the size points of every open issue in a GitHub organization that
/// carries a given label.
#[derive(Parser, Debug, Clone)]
#[command(name = "gh-points", version)]
pub struct Args {
    /// GitHub organization to scan.
    #[arg(long, default_value = "default")]
    pub org: String,

    /// GitHub label marking all issues to be included.
    #[arg(long, default_value = "default")]
    pub label: String,

    /// Base URL of the GitHub REST API.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

/// Validated inputs for a single report run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub org: String,
    pub label: String,
    pub api_url: String,
    pub token: String,
}

impl Settings {
    /// Check the flags and the token. The token is checked first, then org,
    /// then label.
    pub fn validate(args: Args, token: Option<String>) -> Result<Self> {
        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => bail!("Unauthorized: No token present"),
        };
        if args.org.is_empty() {
            bail!("Required --org flag not provided");
        }
        if args.label.is_empty() {
            bail!("Required --label flag not provided");
        }
        Ok(Settings {
            org: args.org,
            label: args.label,
            api_url: args.api_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}
