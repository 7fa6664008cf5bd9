use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Walking-bus guide rotation.
///
/// Shows the Monday/Tuesday/Thursday/Friday duty days of a week, records
/// which guide escorts each day, and sends the weekly planning by SMS.
#[derive(Parser, Debug)]
#[command(name = "pedibus", version, about = "Walking-bus guide rotation")]
pub struct CliArgs {
    /// Guide list file (overrides DATA_DIR/GUIDES_FILE)
    #[arg(long, env = "PEDIBUS_GUIDES", global = true)]
    pub guides: Option<PathBuf>,

    /// History file (overrides DATA_DIR/HISTORY_FILE)
    #[arg(long, env = "PEDIBUS_HISTORY", global = true)]
    pub history: Option<PathBuf>,

    /// Config profile (overrides PEDIBUS_PROFILE)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Which week to show. Defaults to the week ending on the next Friday.
#[derive(Args, Debug, Clone, Default)]
pub struct WeekSelector {
    /// Any day of the wanted week, as yyyy/mm/dd
    #[arg(long)]
    pub friday: Option<String>,

    /// Weeks to move from the selected week (negative goes back)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub weeks: i64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the duty days of a week and the message preview
    Week {
        #[command(flatten)]
        week: WeekSelector,

        /// Print the week as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Assign a guide to a day and save
    Assign {
        /// Day as yyyy/mm/dd
        date: String,
        /// Guide name ("Aucun" clears the day)
        guide: String,
    },

    /// Clear the guide of a day and save
    Unassign {
        /// Day as yyyy/mm/dd
        date: String,
    },

    /// Print the planning message of a week
    Message(WeekSelector),

    /// List guides with their total duty count
    Guides,

    /// Duty count of a guide
    Count {
        guide: String,
        /// Count up to this day (yyyy/mm/dd), inclusive; defaults to today
        #[arg(long)]
        until: Option<String>,
    },

    /// Save the history, then send the planning message by SMS
    Send {
        #[command(flatten)]
        week: WeekSelector,

        /// Send this text instead of the composed message
        #[arg(long)]
        message: Option<String>,

        /// Log the messages without sending them
        #[arg(long)]
        dry_run: bool,
    },
}
