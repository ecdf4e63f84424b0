use clap::Args;
use serde_json::json;

use crate::auth::{generate_token, Claims};
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Identity-provider subject (account id)")]
    pub sub: String,

    #[arg(long, help = "Validity in hours (defaults to AUTH_TOKEN_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if crate::is_production!() {
        anyhow::bail!("refusing to mint subject tokens with APP_ENV=production");
    }

    let hours = args.hours.unwrap_or(config.auth.token_expiry_hours);
    let claims = Claims::new(&config.auth, args.sub, hours);
    let token = generate_token(&config.auth, &claims)?;

    utils::output_success(
        output_format,
        "Subject token issued",
        Some(json!({ "token": token, "sub": claims.sub, "expires_at": claims.exp })),
    )
}
