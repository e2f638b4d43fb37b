use std::{env, io};

use clap::Parser;
use gh_points::{config::{Args, TOKEN_VAR}, github::GitHubClient, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let token = env::var(TOKEN_VAR).ok();
    let mut stdout = io::stdout().lock();
    run(args, token, GitHubClient::new, &mut stdout).await?;
    Ok(())
}
