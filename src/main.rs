mod config;
mod display;
mod export;
mod form;
mod parser;
mod schedule;
mod store;
mod web;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Cli, Command};
use display::{print_schedule, render_coverage_report, write_schedule_to_file};
use export::export_schedule_to_csv;
use form::{validate_submission, PreferenceSubmissionRequest};
use parser::{import_submissions, load_submissions_from_path};
use schedule::{all_slots, Day, Shift};
use store::ScheduleStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shift_scheduler=info,actix_web=info")),
        )
        .init();

    let cli = Cli::parse();

    info!(path = %cli.db.display(), "opening SQLite database");
    let store = ScheduleStore::open(&cli.db)?;

    match cli.command {
        Command::Serve(args) => {
            println!("Access the site at http://localhost:{}", args.port);
            web::start_server(store, args).await?;
        }

        Command::Submit { name, preferences } => {
            let submission = validate_submission(&PreferenceSubmissionRequest { name, preferences })?;
            let employee = store.submit_preferences(&submission)?;
            println!(
                "Shift preferences saved for {} (ID: {}, {} preferences)",
                employee.name,
                employee.id,
                submission.slots.len()
            );
        }

        Command::Import { path } => {
            println!("Loading preferences from {}...", path.display());
            let submissions = load_submissions_from_path(&path)?;
            let summary = import_submissions(&store, &submissions)?;
            println!(
                "Imported {} employees with {} preferences",
                summary.employees, summary.preferences
            );
        }

        Command::Generate { rules, output } => {
            let rule_set = rules.rules();
            let mut rng = rules.rng();
            let outcome = store.regenerate(&rule_set, &mut rng)?;

            let rows = store.load_schedule()?;
            let slots = all_slots(&rule_set.days, &rule_set.shifts);
            print_schedule("Weekly Schedule", &rows, &slots);
            print!("\n{}", render_coverage_report(&outcome.deficits));

            if let Some(path) = output {
                write_schedule_to_file("Weekly Schedule", &rows, &slots, &path)?;
                println!("Schedule saved to {}", path.display());
            }
        }

        Command::View => {
            let rows = store.load_schedule()?;
            match store.generated_at()? {
                Some(at) => println!("Generated at {}", at),
                None => println!("No schedule generated yet."),
            }
            print_schedule("Weekly Schedule", &rows, &all_slots(&Day::ALL, &Shift::ALL));
        }

        Command::Export { path } => {
            let rows = store.load_schedule()?;
            export_schedule_to_csv(&rows, &path)?;
            println!("Exported {} assignments to {}", rows.len(), path.display());
        }
    }

    Ok(())
}
