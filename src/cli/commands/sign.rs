use clap::Args;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::services::{UploadCredentials, UploadSigner};

#[derive(Args, Debug)]
pub struct SignArgs {
    #[arg(long, help = "Target folder (e.g. designs, profiles)")]
    pub folder: String,

    #[arg(long, help = "Optional public id of the uploaded asset")]
    pub public_id: Option<String>,

    #[arg(long, help = "Unix timestamp to sign for (defaults to now)")]
    pub timestamp: Option<i64>,
}

pub fn handle(args: SignArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let credentials = UploadCredentials::from(&config.upload);
    if !credentials.is_complete() {
        anyhow::bail!("CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set");
    }

    let signer = UploadSigner::new(credentials);
    let grant = match args.timestamp {
        Some(timestamp) => signer.issue_signature_at(&args.folder, args.public_id.as_deref(), timestamp)?,
        None => signer.issue_signature(&args.folder, args.public_id.as_deref())?,
    };

    utils::output_success(output_format, "Upload signature issued", Some(serde_json::to_value(&grant)?))
}
