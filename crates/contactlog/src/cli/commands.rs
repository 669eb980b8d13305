//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::contact::NewContact;
use crate::dial::DialRequest;

/// Dial-and-save arguments. Time and place are tagged automatically.
#[derive(Debug, Args)]
pub struct DialCommand {
    /// Contact name
    #[arg(short, long)]
    pub name: String,

    /// Phone number
    #[arg(short = 'p', long)]
    pub number: String,

    /// Relation, e.g. Friend, Parent, Co-worker
    #[arg(short, long)]
    pub relation: Option<String>,
}

impl From<DialCommand> for DialRequest {
    fn from(cmd: DialCommand) -> Self {
        Self {
            name: cmd.name,
            number: cmd.number,
            relation: cmd.relation,
        }
    }
}

/// Append a contact with explicit fields.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Contact name
    #[arg(short, long)]
    pub name: String,

    /// Phone number
    #[arg(short = 'p', long)]
    pub number: String,

    /// Relation label
    #[arg(short, long)]
    pub relation: Option<String>,

    /// Time to record (defaults to now)
    #[arg(short, long)]
    pub time: Option<String>,

    /// Location to record (defaults to the configured place)
    #[arg(short, long)]
    pub location: Option<String>,
}

impl AddCommand {
    /// Build the store input, filling in the time and place supplied by the
    /// caller when the flags were omitted.
    #[must_use]
    pub fn into_contact(self, time: String, location: String) -> NewContact {
        NewContact {
            name: self.name,
            number: self.number,
            time: self.time.unwrap_or(time),
            location: self.location.unwrap_or(location),
            relation: self.relation.filter(|r| !r.trim().is_empty()),
        }
    }
}

/// List arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Sort by name instead of stored order
    #[arg(short, long)]
    pub sort_by_name: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Phone number, matched exactly
    pub number: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Edit arguments. Omitted fields keep their current value.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Current phone number of the contact to edit
    pub number: String,

    /// New name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New phone number
    #[arg(short = 'p', long)]
    pub new_number: Option<String>,

    /// New time
    #[arg(short, long)]
    pub time: Option<String>,

    /// New location
    #[arg(short, long)]
    pub location: Option<String>,

    /// New relation; pass an empty string to clear it
    #[arg(short, long)]
    pub relation: Option<String>,
}

impl EditCommand {
    /// Apply the given overrides on top of an existing contact.
    #[must_use]
    pub fn apply(self, current: NewContact) -> NewContact {
        NewContact {
            name: self.name.unwrap_or(current.name),
            number: self.new_number.unwrap_or(current.number),
            time: self.time.unwrap_or(current.time),
            location: self.location.unwrap_or(current.location),
            relation: match self.relation {
                Some(r) if r.trim().is_empty() => None,
                Some(r) => Some(r),
                None => current.relation,
            },
        }
    }
}

/// Mark-contacted arguments.
#[derive(Debug, Args)]
pub struct MarkCommand {
    /// Contact name, matched exactly
    pub name: String,

    /// Phone number, matched exactly
    pub number: String,
}

/// Stats arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per contact
    Plain,
    /// Aligned columns
    #[default]
    Table,
    /// JSON array
    Json,
}
