use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::schedule::Rules;

#[derive(Debug, Parser)]
#[command(name = "shift-scheduler", version, about = "Weekly shift scheduling from employee preferences")]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "SCHEDULE_DB", default_value = "schedule.db", global = true)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeArgs),
    /// Submit one employee's preferences, e.g. `submit --name Ada Monday-Morning Friday-Evening`
    Submit {
        #[arg(long)]
        name: String,
        preferences: Vec<String>,
    },
    /// Bulk-submit preferences from a CSV file with `name,preferences` columns
    Import { path: PathBuf },
    /// Regenerate the schedule and print it
    Generate {
        #[command(flatten)]
        rules: RuleArgs,
        /// Also write the schedule to this text file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the stored schedule
    View,
    /// Write the stored schedule as CSV
    Export { path: PathBuf },
}

#[derive(Debug, Clone, Args)]
pub struct RuleArgs {
    /// Maximum shifts one employee may be given per week
    #[arg(long = "cap", env = "SHIFT_CAP", default_value_t = 5)]
    pub per_employee_cap: u32,

    /// Minimum employees wanted on every shift
    #[arg(long = "min-coverage", env = "SHIFT_MIN_COVERAGE", default_value_t = 2)]
    pub per_slot_minimum: u32,

    /// Seed for the backfill draw; unset means a fresh random seed per process
    #[arg(long, env = "SCHEDULE_SEED")]
    pub seed: Option<u64>,
}

impl RuleArgs {
    pub fn rules(&self) -> Rules {
        Rules {
            per_employee_cap: self.per_employee_cap,
            per_slot_minimum: self.per_slot_minimum,
            ..Rules::default()
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Password guarding schedule generation; generation is open when unset
    #[arg(long, env = "ADMIN_PASSWORD")]
    pub admin_password: Option<String>,

    #[command(flatten)]
    pub rules: RuleArgs,
}
