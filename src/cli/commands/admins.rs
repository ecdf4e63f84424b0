use std::sync::Arc;

use clap::Subcommand;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::database;
use crate::services::{AdminStore, DocumentAdminStore};

#[derive(Subcommand, Debug)]
pub enum AdminsCommands {
    #[command(about = "Print the administrator allow-list from the configured store")]
    List,
}

pub async fn handle(cmd: AdminsCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminsCommands::List => {
            if config.storage.database_url.is_none() {
                anyhow::bail!("DATABASE_URL is not set; there is no persisted allow-list to read");
            }

            let documents = database::open_document_store(&config.storage).await?;
            let store = DocumentAdminStore::new(Arc::clone(&documents));

            let emails = match store.load().await? {
                Some(snapshot) => snapshot.list.emails,
                None => {
                    tracing::info!(
                        "No allow-list stored yet; {} will be seeded on first use",
                        config.admin.bootstrap_email
                    );
                    Vec::new()
                }
            };

            utils::output_list(output_format, "admins", &emails)
        }
    }
}
