use crate::Config;
use crate::database::migration::Migrator;
use crate::database::{DatabaseManager, DatabaseManagerImpl};
use clap::Subcommand;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Roll back applied migrations
    Down {
        #[arg(
            short,
            long,
            help = "Number of migrations to roll back",
            default_value = "1"
        )]
        steps: u32,
    },
    /// List applied and pending migrations
    Status,
}

pub async fn handle_migrate_command(
    action: MigrateAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let db_manager = DatabaseManagerImpl::new_from_config(&config.database).await?;
    run_migrate_action(action, db_manager.connection()).await
}

async fn run_migrate_action(
    action: MigrateAction,
    connection: &DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MigrateAction::Up => {
            info!("Running pending migrations");
            Migrator::up(connection, None).await?;
            info!("All migrations completed successfully");
        }
        MigrateAction::Down { steps } => {
            info!("Rolling back {} migration(s)", steps);
            Migrator::down(connection, Some(steps)).await?;
            info!("Rollback completed successfully");
        }
        MigrateAction::Status => {
            let applied = Migrator::get_applied_migrations(connection).await?;
            let pending = Migrator::get_pending_migrations(connection).await?;

            for migration in &applied {
                println!("applied  {}", migration.name());
            }
            for migration in &pending {
                println!("pending  {}", migration.name());
            }
            info!(
                applied = applied.len(),
                pending = pending.len(),
                "Migration status"
            );
        }
    }

    Ok(())
}
