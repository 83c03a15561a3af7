use clap::Subcommand;
use serde_json::json;

use crate::cli::{connect, OutputFormat};
use crate::services::CertificateService;

#[derive(Subcommand)]
pub enum CertificateCommands {
    #[command(about = "Check a certificate code the way the public endpoint does")]
    Verify {
        #[arg(help = "Verification code, dashes optional")]
        code: String,
    },
}

pub async fn handle(cmd: CertificateCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = connect().await?;

    match cmd {
        CertificateCommands::Verify { code } => {
            let verification = CertificateService::new(pool.clone()).verify(&code).await?;
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "success": true, "data": verification }))?);
                }
                OutputFormat::Text => {
                    println!("Code:         {}", verification.code);
                    println!("Status:       {:?}", verification.status);
                    println!("Kind:         {}", verification.kind);
                    println!("Board:        {} ({})", verification.board.name, verification.board.registration_number);
                    println!("Issued:       {}", verification.issued_at.format("%Y-%m-%d"));
                    println!("Valid until:  {}", verification.valid_until.format("%Y-%m-%d"));
                    if let Some(revoked_at) = verification.revoked_at {
                        println!("Revoked:      {}", revoked_at.format("%Y-%m-%d"));
                    }
                }
            }
        }
    }

    pool.close().await;
    Ok(())
}
