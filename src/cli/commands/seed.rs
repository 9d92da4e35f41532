use std::path::Path;

use serde_json::json;
use sqlx::PgPool;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;
use crate::seed::{run_seed, SeedConfig, SeedCount};

pub async fn handle(pool: &PgPool, file: &Path, migrate: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let seed_config = SeedConfig::from_path(file)?;

    if migrate {
        DatabaseManager::migrate(pool).await?;
    }

    let report = run_seed(pool, &seed_config).await?;

    if let OutputFormat::Text = output_format {
        for (label, count) in [
            ("accounts", report.accounts),
            ("grade levels", report.grade_levels),
            ("subjects", report.subjects),
            ("prerequisites", report.prerequisites),
            ("AP classes", report.ap_classes),
        ] {
            println!("  {:<14} {}", label, describe(count));
        }
    }

    output_success(
        &output_format,
        &format!("Seeded database from {}", file.display()),
        Some(json!({ "report": report })),
    )
}

fn describe(count: SeedCount) -> String {
    format!("{} created, {} skipped", count.created, count.skipped)
}
