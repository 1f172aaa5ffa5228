use clap::{Args, Parser, Subcommand};
use mhr_core::constants::DEFAULT_DATA_DIR;
use mhr_core::models::{Actor, Delivery, Pregnancy, Visit};
use mhr_core::{
    nesting_policy_from_env_value, AnalyticsService, ClinicalRecord, CoreConfig, ExportTable,
    RecordKind, RecordService, RecordStore, RecordsError, Scope,
};
use mhr_types::{DeliveryId, PatientId, PregnancyId};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mhr")]
#[command(about = "Maternal health records CLI")]
struct Cli {
    /// Directory holding records.yaml
    #[arg(long, global = true, env = "MHR_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Nesting policy: pairwise or full-chain
    #[arg(long, global = true, env = "MHR_NESTING_POLICY")]
    nesting_policy: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ScopeArgs {
    #[arg(long)]
    patient: Option<PatientId>,
    #[arg(long)]
    pregnancy: Option<PregnancyId>,
    #[arg(long)]
    delivery: Option<DeliveryId>,
}

impl From<ScopeArgs> for Scope {
    fn from(args: ScopeArgs) -> Self {
        Scope {
            patient: args.patient,
            pregnancy: args.pregnancy,
            delivery: args.delivery,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print summary statistics as JSON
    Summary {
        /// deliveries, pregnancies or visits
        kind: RecordKind,
        /// Username to act as
        #[arg(long = "as")]
        username: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Export records as CSV
    Export {
        /// deliveries, pregnancies or visits
        kind: RecordKind,
        /// Username to act as
        #[arg(long = "as")]
        username: String,
        #[command(flatten)]
        scope: ScopeArgs,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the patients visible to a user
    Patients {
        /// Username to act as
        #[arg(long = "as")]
        username: String,
    },
    /// Load the records file, check its invariants and print table sizes
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let policy = nesting_policy_from_env_value(cli.nesting_policy)?;
    let cfg = CoreConfig::new(cli.data_dir, policy)?;
    let store = Arc::new(RecordStore::open(&cfg.records_path())?);

    match cli.command {
        Some(Commands::Summary {
            kind,
            username,
            scope,
        }) => {
            let actor = actor_named(&store, &username)?;
            let analytics = AnalyticsService::new(store.clone(), policy);
            let scope = Scope::from(scope);
            let json = match kind {
                RecordKind::Deliveries => summary_json::<Delivery>(&analytics, &actor, scope)?,
                RecordKind::Pregnancies => summary_json::<Pregnancy>(&analytics, &actor, scope)?,
                RecordKind::Visits => summary_json::<Visit>(&analytics, &actor, scope)?,
            };
            println!("{json}");
        }
        Some(Commands::Export {
            kind,
            username,
            scope,
            output,
        }) => {
            let actor = actor_named(&store, &username)?;
            let analytics = AnalyticsService::new(store.clone(), policy);
            let scope = Scope::from(scope);
            let table: ExportTable = match kind {
                RecordKind::Deliveries => analytics.export::<Delivery>(&actor, scope)?,
                RecordKind::Pregnancies => analytics.export::<Pregnancy>(&actor, scope)?,
                RecordKind::Visits => analytics.export::<Visit>(&actor, scope)?,
            };
            let csv = table.to_csv();
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)?;
                    println!("Wrote {} {} to {}", table.rows.len(), kind, path.display());
                }
                None => print!("{csv}"),
            }
        }
        Some(Commands::Patients { username }) => {
            let actor = actor_named(&store, &username)?;
            let records = RecordService::new(store.clone(), policy);
            let patients = records.list_patients(&actor)?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {} {}, MRN: {}",
                        patient.id,
                        patient.first_name,
                        patient.last_name,
                        patient.medical_record_number
                    );
                }
            }
        }
        Some(Commands::Check) => {
            let counts = store.read(|records| {
                [
                    ("users", records.users.len()),
                    ("patients", records.patients.len()),
                    ("pregnancies", records.pregnancies.len()),
                    ("deliveries", records.deliveries.len()),
                    ("visits", records.visits.len()),
                ]
            })?;
            println!("{} is consistent", cfg.records_path().display());
            for (table, count) in counts {
                println!("  {table}: {count}");
            }
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

fn actor_named(store: &RecordStore, username: &str) -> Result<Actor, RecordsError> {
    store.read(|records| {
        let user = records
            .user_by_username(username)
            .ok_or_else(|| RecordsError::UnknownUser(username.to_string()))?;
        records.actor_for(user)
    })?
}

fn summary_json<R: ClinicalRecord>(
    analytics: &AnalyticsService,
    actor: &Actor,
    scope: Scope,
) -> Result<String, Box<dyn std::error::Error>> {
    let summary = analytics.summary::<R>(actor, scope)?;
    Ok(serde_json::to_string_pretty(&summary)?)
}
