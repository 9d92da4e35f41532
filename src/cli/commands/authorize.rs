use serde_json::json;
use sqlx::PgPool;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::models::Role;
use crate::services::AuthorizedUserService;
use crate::validation::is_valid_email;

/// Re-running with the same email and role is a no-op; a different role is refused.
pub async fn handle(pool: &PgPool, email: &str, role: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let email = email.trim();
    if !is_valid_email(email) {
        anyhow::bail!("'{}' is not a valid email address", email);
    }
    let role: Role = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let service = AuthorizedUserService::new(pool.clone());
    if let Some(existing) = service.find(email).await? {
        if existing.role != role {
            anyhow::bail!("{} is already authorized as {}", existing.email, existing.role);
        }
        return output_success(
            &output_format,
            &format!("{} is already authorized as {}", existing.email, existing.role),
            Some(json!({ "authorized_user": existing })),
        );
    }

    let entry = service.create(email, role).await?;

    output_success(
        &output_format,
        &format!("Authorized {} as {}", entry.email, entry.role),
        Some(json!({ "authorized_user": entry })),
    )
}
