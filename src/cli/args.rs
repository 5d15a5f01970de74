//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::Grade;

/// Student directory backed by ordered trees: grades, filtered listings, flat-file persistence
#[derive(Parser, Debug)]
#[command(name = "gradebook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Student file (default: data_file from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath, env = "GRADEBOOK_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Shell,

    /// Print students from the file
    List {
        /// Which students to show
        #[arg(long, value_enum, default_value_t = ListFilter::All)]
        filter: ListFilter,
    },

    /// Add a student to the file
    Add {
        surname: String,
        initials: String,
        /// Exam grades
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        grades: Vec<Grade>,
    },

    /// Remove one student by surname
    Remove { surname: String },

    /// Replace a student (remove by surname, then add)
    Edit {
        surname: String,
        new_surname: String,
        initials: String,
        /// Exam grades
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        grades: Vec<Grade>,
    },

    /// Show the directory's tree shape
    Tree,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}

/// Listing filters.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    /// Everyone
    All,
    /// Only 5s
    Excellent,
    /// At least one 3
    Threes,
    /// Exactly one 2
    SingleTwo,
}
