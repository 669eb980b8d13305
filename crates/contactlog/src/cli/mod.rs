//! Command-line interface for contactlog.
//!
//! This module provides the CLI structure and output rendering for the
//! `contactlog` binary.

mod commands;

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DialCommand, EditCommand, ListCommand, MarkCommand,
    OutputFormat, ShowCommand, StatsCommand,
};

use crate::contact::{ContactRecord, ContactStats};
use crate::logging::Verbosity;

/// contactlog - Log who you called, when and where
///
/// Save contacts tagged with the time and place they were logged, browse
/// them, edit them, mark them as contacted, and see how many you have
/// reached.
#[derive(Debug, Parser)]
#[command(name = "contactlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save a new contact tagged with the current time and place
    Dial(DialCommand),

    /// Append a contact with explicit fields
    Add(AddCommand),

    /// List saved contacts
    List(ListCommand),

    /// Show contacts with a given number
    Show(ShowCommand),

    /// Edit the contact with a given number
    Edit(EditCommand),

    /// Mark contacts as contacted
    Mark(MarkCommand),

    /// Show contacted vs not-contacted counts
    Stats(StatsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

fn status_label(contact: &ContactRecord) -> &'static str {
    if contact.contacted {
        "contacted"
    } else {
        "pending"
    }
}

/// Render contacts in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_contacts(
    contacts: &[ContactRecord],
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(contacts),
        OutputFormat::Plain => Ok(render_plain(contacts)),
        OutputFormat::Table => Ok(render_table(contacts)),
    }
}

fn render_plain(contacts: &[ContactRecord]) -> String {
    let mut out = String::new();
    for c in contacts {
        let _ = write!(out, "{} <{}> {} @ {}", c.name, c.number, c.time, c.location);
        if let Some(relation) = &c.relation {
            let _ = write!(out, " ({relation})");
        }
        let _ = writeln!(out, " [{}]", status_label(c));
    }
    out
}

fn render_table(contacts: &[ContactRecord]) -> String {
    const HEADERS: [&str; 6] = ["NAME", "NUMBER", "TIME", "LOCATION", "RELATION", "STATUS"];

    let rows: Vec<[&str; 6]> = contacts
        .iter()
        .map(|c| {
            [
                c.name.as_str(),
                c.number.as_str(),
                c.time.as_str(),
                c.location.as_str(),
                c.relation.as_deref().unwrap_or("-"),
                status_label(c),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&HEADERS).chain(rows.iter()) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}

/// Render a single contact as labelled lines.
#[must_use]
pub fn render_details(contact: &ContactRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", contact.name);
    let _ = writeln!(out, "  Number:    {}", contact.number);
    let _ = writeln!(out, "  Saved at:  {}", contact.time);
    let _ = writeln!(out, "  Location:  {}", contact.location);
    let _ = writeln!(
        out,
        "  Relation:  {}",
        contact.relation.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out, "  Status:    {}", status_label(contact));
    out
}

/// Render contact statistics with a simple bar for each bucket.
#[must_use]
pub fn render_stats(stats: &ContactStats) -> String {
    const BAR_WIDTH: usize = 30;

    let max = stats.contacted.max(stats.not_contacted).max(1);
    let bar = |value: usize| "#".repeat(value * BAR_WIDTH / max);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Contacted      {:>5}  {}",
        stats.contacted,
        bar(stats.contacted)
    );
    let _ = writeln!(
        out,
        "Not contacted  {:>5}  {}",
        stats.not_contacted,
        bar(stats.not_contacted)
    );
    let _ = writeln!(
        out,
        "Total          {:>5}  {:.0}% contacted",
        stats.total,
        stats.contacted_ratio() * 100.0
    );
    out
}

/// The stderr warning shown when the stored list could not be decoded.
#[must_use]
pub fn corrupt_slot_warning(key: &str) -> String {
    format!(
        "warning: stored contacts in slot '{key}' could not be read and are treated as an empty list; the next save replaces them"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn contact(name: &str, contacted: bool) -> ContactRecord {
        ContactRecord {
            name: name.to_string(),
            number: "555-1234".to_string(),
            time: "10:30 AM".to_string(),
            location: "Windhoek".to_string(),
            relation: None,
            contacted,
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "contactlog");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["contactlog", "-vv", "stats"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);

        let cli = Cli::try_parse_from(["contactlog", "-q", "stats"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_dial() {
        let cli = Cli::try_parse_from([
            "contactlog",
            "dial",
            "--name",
            "Amanda",
            "--number",
            "555-1234",
            "-r",
            "Friend",
        ])
        .unwrap();
        match cli.command {
            Command::Dial(cmd) => {
                assert_eq!(cmd.name, "Amanda");
                assert_eq!(cmd.number, "555-1234");
                assert_eq!(cmd.relation.as_deref(), Some("Friend"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_dial_requires_number() {
        assert!(Cli::try_parse_from(["contactlog", "dial", "--name", "Amanda"]).is_err());
    }

    #[test]
    fn test_parse_mark() {
        let cli = Cli::try_parse_from(["contactlog", "mark", "Amanda", "555-1234"]).unwrap();
        assert!(matches!(cli.command, Command::Mark(ref m) if m.name == "Amanda" && m.number == "555-1234"));
    }

    #[test]
    fn test_parse_list_json() {
        let cli = Cli::try_parse_from(["contactlog", "list", "-s", "--format", "json"]).unwrap();
        match cli.command {
            Command::List(cmd) => {
                assert!(cmd.sort_by_name);
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["contactlog", "-c", "/custom/config.toml", "stats"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_render_plain() {
        let mut with_relation = contact("Bo", true);
        with_relation.relation = Some("Parent".to_string());

        let out = render_contacts(&[contact("Amanda", false), with_relation], OutputFormat::Plain)
            .unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "Amanda <555-1234> 10:30 AM @ Windhoek [pending]");
        assert_eq!(
            lines[1],
            "Bo <555-1234> 10:30 AM @ Windhoek (Parent) [contacted]"
        );
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let out = render_contacts(
            &[contact("Amanda Longname", false), contact("Bo", true)],
            OutputFormat::Table,
        )
        .unwrap();
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME"));
        let number_col = lines[0].find("NUMBER").unwrap();
        assert_eq!(lines[1].find("555-1234"), Some(number_col));
        assert_eq!(lines[2].find("555-1234"), Some(number_col));
    }

    #[test]
    fn test_render_json() {
        let out = render_contacts(&[contact("Amanda", false)], OutputFormat::Json).unwrap();
        let parsed: Vec<ContactRecord> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec![contact("Amanda", false)]);
    }

    #[test]
    fn test_render_details() {
        let out = render_details(&contact("Amanda", true));
        assert!(out.starts_with("Amanda\n"));
        assert!(out.contains("Relation:  -"));
        assert!(out.contains("Status:    contacted"));
    }

    #[test]
    fn test_render_stats() {
        let stats = ContactStats {
            total: 3,
            contacted: 1,
            not_contacted: 2,
        };
        let out = render_stats(&stats);
        let lines: Vec<_> = out.lines().collect();

        assert!(lines[0].ends_with(&"#".repeat(15)));
        assert!(lines[1].ends_with(&"#".repeat(30)));
        assert!(lines[2].contains('3'));
        assert!(lines[2].ends_with("33% contacted"));
    }

    #[test]
    fn test_render_stats_empty() {
        let out = render_stats(&ContactStats::default());
        assert!(!out.contains('#'));
        assert!(out.contains("0% contacted"));
    }

    #[test]
    fn test_corrupt_slot_warning_names_slot() {
        let warning = corrupt_slot_warning("people");
        assert!(warning.starts_with("warning:"));
        assert!(warning.contains("'people'"));
    }
}
