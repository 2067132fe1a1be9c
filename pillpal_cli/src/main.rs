use clap::{Parser, Subcommand};
use pillpal_core::notify::drain;
use pillpal_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pillpal")]
#[command(about = "Medication reminders and adherence tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the persistence API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List medicines with their next dose (default)
    List,

    /// Add a medicine and its daily dose times
    Add {
        #[arg(long)]
        name: String,

        /// Dosage description, e.g. "10mg"
        #[arg(long)]
        dosage: String,

        /// Type tag (tablet, capsule, liquid, ...)
        #[arg(long = "type", default_value = "tablet")]
        kind: String,

        /// Dose time as HH:MM; repeat for several doses
        #[arg(long = "time")]
        times: Vec<String>,

        /// Units currently on hand
        #[arg(long, default_value_t = 0)]
        remaining: u32,

        /// Warn when remaining units drop to this level
        #[arg(long)]
        refill_threshold: Option<u32>,

        /// Active weekdays, 1 (Monday) to 7 (Sunday), comma separated
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u8>>,
    },

    /// Delete a medicine
    Delete { id: String },

    /// Mark today's dose of a medicine as taken
    Take { id: String },

    /// Mark today's dose of a medicine as skipped
    Skip { id: String },

    /// Show today's adherence summary
    Stats,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    pillpal_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    }
    .with_env_overrides();
    if let Some(url) = cli.api_url {
        config.api.base_url = Some(url);
    }

    let api = HttpMedicineApi::from_config(&config.api)?;
    tracing::debug!("Using persistence API at {}", api.base_url());
    let (notifier, mut notifications) = Notifier::channel();
    let mut store = MedicineStore::new(api, notifier, config.adherence.taken_policy);

    let result = run(&mut store, cli.command.unwrap_or(Commands::List)).await;

    for notification in drain(&mut notifications) {
        display_notification(&notification);
    }

    result
}

async fn run<A: MedicineApi>(store: &mut MedicineStore<A>, command: Commands) -> Result<()> {
    match command {
        Commands::List => {
            store.refresh().await?;
            display_medicines(store.medicines());
        }
        Commands::Add {
            name,
            dosage,
            kind,
            times,
            remaining,
            refill_threshold,
            days,
        } => {
            let days = days.map(WeekdaySet::try_from).transpose()?;
            let new = NewMedicine {
                name,
                dosage,
                kind,
                times,
                remaining,
                refill_threshold,
                days,
            };
            let medicine = store.add(new).await?;
            println!("Added {} (id {})", medicine.name, medicine.id);
        }
        Commands::Delete { id } => {
            store.refresh().await?;
            store.delete(&RecordId::new(id)).await?;
        }
        Commands::Take { id } => {
            store.refresh().await?;
            store
                .record_intake(&RecordId::new(id), IntakeStatus::Taken)
                .await?;
        }
        Commands::Skip { id } => {
            store.refresh().await?;
            store
                .record_intake(&RecordId::new(id), IntakeStatus::Skipped)
                .await?;
        }
        Commands::Stats => {
            store.refresh().await?;
            display_summary(&store.summary());
        }
    }

    Ok(())
}

fn display_medicines(medicines: &[MedicineView]) {
    if medicines.is_empty() {
        println!("No medicines yet. Add one with `pillpal add`.");
        return;
    }

    for view in medicines {
        let med = &view.medicine;
        println!("[{}] {} ({}, {})", med.id, med.name, med.dosage, med.kind);
        println!("    Next dose: {}", view.next_dose);

        let mut stock = format!(
            "    Remaining: {} (refill at {})",
            med.remaining_count, med.refill_threshold
        );
        if view.is_low_stock() {
            stock.push_str("  ⚠ refill needed");
        }
        println!("{}", stock);

        if view.taken {
            println!("    ✓ Taken today");
        }
        if let Some(ref instructions) = med.instructions {
            println!("    ℹ {}", instructions);
        }
    }
}

fn display_summary(summary: &AdherenceSummary) {
    println!(
        "Today's doses: {} of {} completed",
        summary.completed_today, summary.doses_today
    );
    match &summary.upcoming {
        Some(dose) => println!("Next dose: {} ({})", dose.time, dose.name),
        None => println!("Next dose: None"),
    }
    println!("Refill needed: {}", summary.refill_needed);
}

fn display_notification(notification: &Notification) {
    match notification.severity {
        Severity::Info => println!("✓ {}", notification),
        Severity::Destructive => eprintln!("✗ {}", notification),
    }
}
