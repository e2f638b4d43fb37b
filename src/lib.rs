use std::{fmt::Display, io::Write};

use itertools::Itertools;

pub mod config;
pub mod github;
pub mod points;

use config::{Args, Settings};
use github::{Issue, IssueListOptions, IssueSource};

type Result<T> = anyhow::Result<T>;

/// The "average per milestone" divides by this fixed count rather than by
/// the number of milestones actually seen.
pub const MILESTONES: u32 = 3;

/// Running sum of points across every issue reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub sum: u32,
}

impl Totals {
    fn add(&mut self, points: u32) {
        self.sum += points;
    }

    pub fn average_per_milestone(&self) -> u32 {
        self.sum / MILESTONES
    }
}

impl Display for Totals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TOTAL SUM: {}\nAVG PER MILESTONE: {}",
            self.sum,
            self.average_per_milestone()
        )
    }
}

/// One printed line of the report.
struct Row<'a> {
    title: &'a str,
    milestone: &'a str,
    assignee: &'a str,
    points: &'a dyn Display,
    url: &'a str,
}

impl Row<'_> {
    fn header() -> Row<'static> {
        Row {
            title: "Issue",
            milestone: "Milestone",
            assignee: "Assignee",
            points: &"Points",
            url: "URL",
        }
    }

    fn separator() -> Row<'static> {
        Row {
            title: "---",
            milestone: "---",
            assignee: "---",
            points: &"---",
            url: "---",
        }
    }
}

impl Display for Row<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<70}\t{:>20}\t{:>20}\t{:>8}\t{}",
            self.title,
            self.milestone,
            self.assignee,
            self.points,
            self.url
        )
    }
}

fn write_issue(out: &mut impl Write, issue: &Issue, points: u32) -> Result<()> {
    let row = Row {
        title: &issue.title,
        milestone: issue.milestone.as_ref().map_or("", |m| m.title.as_str()),
        assignee: issue.assignee.as_ref().map_or("", |a| a.display_name()),
        points: &points,
        url: &issue.html_url,
    };
    writeln!(out, "{row}")?;
    Ok(())
}

/// Walk every page of matching issues, printing a table per page, and
/// finish with the totals. Rows already written stay written if a later
/// page fails; the summary is only written once every page is in.
pub async fn report<S: IssueSource>(
    source: &S,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<Totals> {
    let mut totals = Totals::default();
    let mut opts = IssueListOptions::open_with_label(&settings.label);

    loop {
        let page = source
            .list_by_org(&settings.org, &opts)
            .await
            .map_err(|e| e.context("error listing GitHub issues"))?;
        log::debug!(
            "fetched page {} with {} issues, next page: {:?}",
            opts.page.unwrap_or(1),
            page.issues.len(),
            page.next_page
        );

        writeln!(out, "{}", Row::header())?;
        writeln!(out, "{}", Row::separator())?;
        for issue in &page.issues {
            let points = points::points_for(issue.label_names());
            log::trace!(
                "{}: [{}] -> {points}",
                issue.html_url,
                issue.label_names().join(", ")
            );
            totals.add(points);
            write_issue(out, issue, points)?;
        }

        match page.next_page {
            Some(next) => opts.page = Some(next),
            None => break,
        }
    }

    writeln!(out, "\n\n{totals}")?;
    Ok(totals)
}

/// Validate the inputs, then connect and report. `connect` is only called
/// with validated settings, so a configuration error never reaches the
/// network.
pub async fn run<S, F>(
    args: Args,
    token: Option<String>,
    connect: F,
    out: &mut impl Write,
) -> Result<Totals>
where
    S: IssueSource,
    F: FnOnce(&Settings) -> Result<S>,
{
    let settings = Settings::validate(args, token)?;
    log::info!(
        "Scanning GitHub organization {:?} and all issues labeled {:?}...",
        settings.org,
        settings.label
    );
    let source = connect(&settings)?;
    report(&source, &settings, out).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use github::{Label, Milestone, User};

    #[test]
    fn header_and_issue_rows_line_up() {
        let issue = Issue {
            title: "Flaky deploy".into(),
            milestone: Some(Milestone { title: "M1".into() }),
            assignee: Some(User { login: "jdoe".into(), name: None }),
            labels: vec![Label { name: "size-s".into() }],
            html_url: "https://github.com/acme/api/issues/1".into(),
        };
        let mut out = Vec::new();
        write_issue(&mut out, &issue, 1).unwrap();
        let line = String::from_utf8(out).unwrap();

        let header = Row::header().to_string();
        let cols: Vec<_> = line.trim_end().split('\t').collect();
        let head_cols: Vec<_> = header.split('\t').collect();
        assert_eq!(cols.len(), 5);
        for (col, head) in cols.iter().zip(&head_cols).take(4) {
            assert_eq!(col.len(), head.len());
        }
        assert_eq!(cols[0].trim_end(), "Flaky deploy");
        assert_eq!(cols[1], format!("{:>20}", "M1"));
        assert_eq!(cols[2], format!("{:>20}", "jdoe"));
        assert_eq!(cols[3], "       1");
        assert_eq!(cols[4], "https://github.com/acme/api/issues/1");
    }

    #[test]
    fn missing_milestone_and_assignee_are_blank() {
        let issue = Issue {
            title: "Orphan".into(),
            milestone: None,
            assignee: None,
            labels: vec![],
            html_url: "u".into(),
        };
        let mut out = Vec::new();
        write_issue(&mut out, &issue, 500).unwrap();
        let line = String::from_utf8(out).unwrap();
        let cols: Vec<_> = line.trim_end().split('\t').collect();
        assert_eq!(cols[1].trim(), "");
        assert_eq!(cols[2].trim(), "");
        assert_eq!(cols[3].trim(), "500");
    }

    #[test]
    fn average_uses_integer_division_by_three() {
        let totals = Totals { sum: 506 };
        assert_eq!(totals.average_per_milestone(), 168);
        assert_eq!(totals.to_string(), "TOTAL SUM: 506\nAVG PER MILESTONE: 168");
    }
}
