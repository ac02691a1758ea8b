mod authors;
mod github;
mod issues;
mod range;
mod report;

use anyhow::Result;
use clap::Parser;
use github::GithubClient;
use range::DateRange;

/// The Racket organization repositories covered by every report.
const REPOS: &[&str] = &[
    "racket",
    "ChezScheme",
    "redex",
    "typed-racket",
    "drracket",
    "scribble",
    "plot",
];

#[derive(Parser)]
#[command(name = "repostats")]
#[command(about = "Monthly contribution statistics for the Racket repositories")]
#[command(version)]
struct Cli {
    /// The month to check (1-12)
    #[arg(short, long)]
    month: u32,

    /// The year to check (2- or 4-digit)
    #[arg(short, long)]
    year: i32,

    /// Output the list of authors
    #[arg(short, long)]
    authors: bool,

    /// Output stats on issues/PRs
    #[arg(short, long)]
    issues: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let range = range::resolve(cli.month, cli.year)?;

    println!(
        "Analyzing repositories for the month of {}, {}",
        cli.month, cli.year
    );
    println!("Year begins: {}", range.year_start);
    println!("Analysis range: {} - {}", range.range_start, range.range_end);

    let client = GithubClient::new();

    if cli.issues {
        run_issue_report(&client, range).await;
    }
    if cli.authors {
        run_author_report(&client, range).await;
    }

    Ok(())
}

/// Fan out one task per repo for the issue list and in-range commit count,
/// then print per-repo reports in the configured repo order. A repo whose
/// fetch fails is logged and omitted; the rest still report.
async fn run_issue_report(client: &GithubClient, range: DateRange) {
    let mut tasks = Vec::new();
    for &repo in REPOS {
        let client = client.clone();
        tasks.push((
            repo,
            tokio::spawn(async move {
                let records = client.list_issues(repo).await?;
                let stats = issues::classify(&records, &range);
                let commits = client
                    .count_commits(repo, range.range_start, range.range_end)
                    .await?;
                anyhow::Ok(report::RepoReport {
                    repo,
                    commits,
                    stats,
                })
            }),
        ));
    }

    for (repo, task) in tasks {
        match task.await {
            Ok(Ok(repo_report)) => report::print_repo_report(&repo_report),
            Ok(Err(e)) => eprintln!("Skipping {repo} in the issue report: {e:#}"),
            Err(e) => eprintln!("Skipping {repo} in the issue report: task panicked: {e}"),
        }
    }
}

/// Fan out one commit-history task per repo (since year start), join, fold
/// the per-repo author maps into one, then print the contributor rosters.
async fn run_author_report(client: &GithubClient, range: DateRange) {
    let mut tasks = Vec::new();
    for &repo in REPOS {
        let client = client.clone();
        tasks.push((
            repo,
            tokio::spawn(async move {
                let entries = client.list_commits(repo, range.year_start, None).await?;
                anyhow::Ok(authors::collect(repo, entries))
            }),
        ));
    }

    let mut maps = Vec::new();
    for (repo, task) in tasks {
        match task.await {
            Ok(Ok(map)) => maps.push(map),
            Ok(Err(e)) => eprintln!("Skipping {repo} in the author report: {e:#}"),
            Err(e) => eprintln!("Skipping {repo} in the author report: task panicked: {e}"),
        }
    }

    let merged = authors::merge_all(maps);
    report::print_author_report(&merged, &range);
}
