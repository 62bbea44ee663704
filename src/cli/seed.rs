//! Seed command - bulk-inserts test users
//!
//! Records go through the exact same `UserService::create_user` path as the
//! HTTP API, so every record gets the same sanitization, validation and
//! uniqueness handling. This command is glue, not a second validation code
//! path.

use std::path::PathBuf;

use clap::Args;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::DomainError;
use crate::infrastructure::logging;
use crate::infrastructure::user::CreateUserInput;

/// Arguments for the seed command
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Path to a JSON file with user records (array of {username, age})
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,

    /// Inline JSON with user records
    #[arg(long)]
    pub data: Option<String>,

    /// Delete existing users before inserting
    #[arg(long)]
    pub clear: bool,
}

/// One record to seed; loosely typed so bad records are reported through
/// the regular validation messages instead of failing deserialization
#[derive(Debug, Clone, Deserialize)]
struct SeedRecord {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    age: Option<Value>,
}

/// Built-in test data, used when neither --file nor --data is given
const DEFAULT_USERS: &[(&str, i64)] = &[
    ("alice_chen", 25),
    ("bob_wang", 30),
    ("charlie_li", 22),
    ("diana_zhao", 28),
    ("edward_liu", 35),
    ("fiona_xu", 24),
    ("george_sun", 29),
    ("helen_wu", 26),
    ("ivan_zhang", 31),
    ("jenny_huang", 23),
    ("kevin_ma", 27),
    ("linda_zhou", 32),
    ("mike_gao", 24),
    ("nancy_feng", 28),
    ("oscar_ding", 33),
    ("penny_tang", 25),
    ("quinn_yu", 29),
    ("ruby_luo", 26),
    ("steve_han", 34),
    ("tina_cao", 27),
];

/// Run the seed command against the configured database
pub async fn run(args: SeedArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let state = crate::create_app_state(&config).await?;
    let records = load_records(&args)?;

    if args.clear {
        let removed = state.user_service.clear_users().await?;
        info!(removed, "cleared existing users");
    }

    info!(count = records.len(), "seeding users");

    let mut created = 0usize;
    let mut failed = 0usize;

    for (index, record) in records.into_iter().enumerate() {
        let result = state
            .user_service
            .create_user(CreateUserInput {
                username: record.username.clone(),
                age: record.age,
            })
            .await;

        match result {
            Ok(user) => {
                created += 1;
                info!(id = user.id(), username = user.username(), "seeded user");
            }
            Err(DomainError::Validation { fields, .. }) => {
                failed += 1;
                warn!(record = index + 1, ?fields, "record failed validation");
            }
            Err(err) => {
                failed += 1;
                warn!(record = index + 1, error = %err, "record failed");
            }
        }
    }

    info!(created, failed, total = created + failed, "seeding finished");

    Ok(())
}

fn load_records(args: &SeedArgs) -> anyhow::Result<Vec<SeedRecord>> {
    let raw = match (&args.file, &args.data) {
        (Some(path), _) => Some(std::fs::read_to_string(path)?),
        (None, Some(data)) => Some(data.clone()),
        (None, None) => None,
    };

    match raw {
        Some(raw) => {
            let value: Value = serde_json::from_str(&raw)?;
            let records = match value {
                Value::Array(items) => items
                    .into_iter()
                    .map(serde_json::from_value)
                    .collect::<Result<Vec<SeedRecord>, _>>()?,
                // A single object is treated as a one-record list
                object => vec![serde_json::from_value(object)?],
            };
            Ok(records)
        }
        None => Ok(DEFAULT_USERS
            .iter()
            .map(|(username, age)| SeedRecord {
                username: Some((*username).to_string()),
                age: Some(Value::from(*age)),
            })
            .collect()),
    }
}
