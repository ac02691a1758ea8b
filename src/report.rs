use crate::authors::{self, ContributionMap};
use crate::issues::IssueStats;
use crate::range::DateRange;
use chrono::Datelike;

/// Everything the issue/PR report prints for one repository.
#[derive(Debug)]
pub struct RepoReport {
    pub repo: &'static str,
    pub commits: usize,
    pub stats: IssueStats,
}

pub fn print_repo_report(report: &RepoReport) {
    println!("Repo {}", report.repo);
    println!("# Commits: {}", report.commits);
    println!(
        "Issues: {}/{}/{}",
        report.stats.issues.new, report.stats.issues.closed, report.stats.issues.current
    );
    println!(
        "PRs: {}/{}/{}",
        report.stats.prs.new, report.stats.prs.closed, report.stats.prs.current
    );
}

/// Print the active-in-range roster and the new-contributor roster, each
/// sorted by display name under a count header.
pub fn print_author_report(merged: &ContributionMap, range: &DateRange) {
    let mut contributors = Vec::new();
    let mut newcomers = Vec::new();

    for (key, contributor) in merged {
        let activity = authors::classify(contributor, range);
        let display = if contributor.name.is_empty() {
            key.clone()
        } else {
            contributor.name.clone()
        };
        if activity.active {
            contributors.push(display.clone());
        }
        if activity.new {
            newcomers.push(display);
        }
    }

    contributors.sort();
    newcomers.sort();

    println!("Contributions by ({}):", contributors.len());
    for name in &contributors {
        println!("* {name}");
    }

    println!(
        "Of these, {} are new contributors for {}:",
        newcomers.len(),
        range.range_start.year()
    );
    for name in &newcomers {
        println!("* {name}");
    }
}
