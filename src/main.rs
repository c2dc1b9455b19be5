//! ADRD catalog management console - entry point.
//!
//! Command-line surface over the session guard and the upload review
//! workflow.
//!
//! Usage:
//!   adrd-console login --username NAME [--password PASS]
//!   adrd-console logout
//!   adrd-console whoami
//!   adrd-console list [--status pending|approved|rejected|all]
//!   adrd-console show --id N
//!   adrd-console approve --id N [--notes TEXT]
//!   adrd-console reject --id N [--notes TEXT]
//!   adrd-console submit --file PATH [--uploaded-by NAME]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use adrd_kg_lib::client::CatalogClient;
use adrd_kg_lib::config::Config;
use adrd_kg_lib::error::{ClientError, ClientResult};
use adrd_kg_lib::models::{NewUpload, ReviewDecision, StatusFilter};
use adrd_kg_lib::preview::RowPreview;
use adrd_kg_lib::session::{FileSessionStore, SessionGuard};
use adrd_kg_lib::workflow::ReviewWorkflow;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let command = args[1].as_str();

    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    let client = match CatalogClient::new(&config.api_base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let guard = SessionGuard::new(client.clone(), store);

    let outcome = match command {
        "login" => cmd_login(&guard, &args).await,
        "logout" => {
            guard.logout().await;
            println!("Logged out");
            Ok(())
        }
        "whoami" => cmd_whoami(&guard),
        "list" | "ls" => cmd_list(&client, &guard, &config, &args).await,
        "show" => cmd_show(&client, &guard, &args).await,
        "approve" => cmd_review(&client, &guard, &config, &args, ReviewDecision::Approve).await,
        "reject" => cmd_review(&client, &guard, &config, &args, ReviewDecision::Reject).await,
        "submit" => cmd_submit(&client, &args).await,
        _ => {
            eprintln!("Unknown command: {command}");
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(err) = outcome {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn cmd_login(guard: &SessionGuard, args: &[String]) -> ClientResult<()> {
    let username = flag_value(args, "--username", "-u")
        .ok_or_else(|| ClientError::InvalidInput("--username is required".to_string()))?;
    let password = flag_value(args, "--password", "-p")
        .or_else(|| env::var("ADRD_PASSWORD").ok())
        .ok_or_else(|| {
            ClientError::InvalidInput("provide --password or set ADRD_PASSWORD".to_string())
        })?;

    let session = guard.login(&username, SecretString::from(password)).await?;
    println!("Logged in as {}", session.username);
    Ok(())
}

fn cmd_whoami(guard: &SessionGuard) -> ClientResult<()> {
    match guard.username() {
        Some(username) => println!("Logged in as {username}"),
        None => println!("Not logged in"),
    }
    Ok(())
}

async fn cmd_list(
    client: &CatalogClient,
    guard: &SessionGuard,
    config: &Config,
    args: &[String],
) -> ClientResult<()> {
    guard.require_session()?;

    let filter = match flag_value(args, "--status", "-s") {
        Some(raw) => StatusFilter::parse(&raw).ok_or_else(|| {
            ClientError::InvalidInput(format!(
                "unknown status '{raw}' (expected pending, approved, rejected, or all)"
            ))
        })?,
        None => StatusFilter::Pending,
    };

    let workflow = ReviewWorkflow::new(
        client.clone(),
        Duration::from_millis(config.settle_refresh_ms),
    );
    let uploads = workflow.select_status(filter).await?;

    if uploads.is_empty() {
        println!("No uploads found for this status.");
        return Ok(());
    }

    println!("{} upload(s) with status '{filter}':", uploads.len());
    for upload in &uploads {
        println!(
            "  #{:<5} {:<32} {:<6} {:<12} by {} at {}",
            upload.id,
            upload.file_name,
            upload.file_type,
            upload.status,
            upload.uploader_label(),
            upload.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

async fn cmd_show(
    client: &CatalogClient,
    guard: &SessionGuard,
    args: &[String],
) -> ClientResult<()> {
    guard.require_session()?;
    let id = parse_id_arg(args)?;

    let detail = client.upload_detail(id).await?;
    println!("Upload #{}: {}", detail.id, detail.file_name);
    println!("  Type:        {}", detail.file_type);
    println!(
        "  Uploaded by: {}",
        detail.uploaded_by.as_deref().unwrap_or("Anonymous")
    );
    println!("  Status:      {}", detail.status);
    println!("  Created at:  {}", detail.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(reviewed_at) = detail.reviewed_at {
        println!("  Reviewed at: {}", reviewed_at.format("%Y-%m-%d %H:%M"));
    }
    if let Some(notes) = detail.review_notes.as_deref().filter(|n| !n.is_empty()) {
        println!("  Notes:       {notes}");
    }

    let preview = RowPreview::from_rows(&detail.file_content);
    if preview.is_empty() {
        println!("  No file content available for preview.");
        return Ok(());
    }

    println!("  Preview ({} total rows):", preview.total_rows);
    println!("    {}", preview.headers.join(" | "));
    for row in &preview.rows {
        println!("    {}", row.join(" | "));
    }
    if preview.truncated() {
        println!(
            "    ... showing first {} of {} rows",
            preview.rows.len(),
            preview.total_rows
        );
    }
    Ok(())
}

async fn cmd_review(
    client: &CatalogClient,
    guard: &SessionGuard,
    config: &Config,
    args: &[String],
    decision: ReviewDecision,
) -> ClientResult<()> {
    let session = guard.require_session()?;
    let id = parse_id_arg(args)?;
    let notes = flag_value(args, "--notes", "-n").unwrap_or_default();

    let workflow = ReviewWorkflow::new(
        client.clone(),
        Duration::from_millis(config.settle_refresh_ms),
    );
    let outcome = workflow
        .submit_review(id, decision, &notes, &session.username)
        .await?;

    println!("{}", outcome.message);
    if !outcome.warnings.is_empty() {
        println!("{} row(s) had errors:", outcome.warnings.len());
        for warning in &outcome.warnings {
            println!("  - {warning}");
        }
    }

    let remaining = workflow.settle_refresh().await?;
    println!("{} upload(s) still pending.", remaining.len());
    Ok(())
}

async fn cmd_submit(client: &CatalogClient, args: &[String]) -> ClientResult<()> {
    let path = flag_value(args, "--file", "-f")
        .ok_or_else(|| ClientError::InvalidInput("--file is required".to_string()))?;
    let uploaded_by = flag_value(args, "--uploaded-by", "-b").unwrap_or_default();

    let bytes = tokio::fs::read(&path).await?;
    let file_name = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ClientError::InvalidInput(format!("invalid file path '{path}'")))?;

    let upload = NewUpload::from_bytes(file_name, &bytes, &uploaded_by);
    let receipt = client.submit_upload(&upload).await?;
    println!("{} (upload id {})", receipt.message, receipt.upload_id);
    Ok(())
}

fn flag_value(args: &[String], long: &str, short: &str) -> Option<String> {
    let mut i = 2;
    while i < args.len() {
        if (args[i] == long || args[i] == short) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn parse_id_arg(args: &[String]) -> ClientResult<i64> {
    let raw = flag_value(args, "--id", "-i")
        .ok_or_else(|| ClientError::InvalidInput("--id is required".to_string()))?;
    raw.parse::<i64>()
        .map_err(|_| ClientError::InvalidInput(format!("'{raw}' is not a valid upload id")))
}

fn print_usage() {
    println!("ADRD catalog management console");
    println!();
    println!("Usage: adrd-console <command> [options]");
    println!();
    println!("Commands:");
    println!("  login --username NAME [--password PASS]   Log in (or set ADRD_PASSWORD)");
    println!("  logout                                    Log out and clear the session");
    println!("  whoami                                    Show the current session");
    println!("  list [--status S]                         List uploads (pending|approved|rejected|all)");
    println!("  show --id N                               Show one upload with a row preview");
    println!("  approve --id N [--notes TEXT]             Approve a pending upload");
    println!("  reject --id N [--notes TEXT]              Reject a pending upload");
    println!("  submit --file PATH [--uploaded-by NAME]   Submit a spreadsheet for review");
}
