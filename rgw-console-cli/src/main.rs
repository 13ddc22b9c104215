//! Command line entry point of the RGW debug console.

mod config;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{debug, info, LevelFilter};
use rgw_console_bucket_policy::{BucketPolicyService, S3PolicyStore};

use crate::config::LocalConfig;
use crate::output::PolicyListing;

const DEFAULT_CONFIG_PATH: &str = "config/local_config.json";

#[derive(Parser, Debug)]
#[command(
    name = "rgw-console",
    version,
    about = "Debug console for S3-compatible (Ceph RGW) object stores"
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(
        long,
        global = true,
        env = "RGW_CONSOLE_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    /// Configured user whose credentials are used (defaults to `default-user`)
    #[arg(long, global = true, env = "RGW_CONSOLE_USER")]
    user: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect and edit bucket policies
    #[command(subcommand)]
    Policy(PolicyCommand),
}

#[derive(Subcommand, Debug)]
enum PolicyCommand {
    /// Print the raw policy document of a bucket
    Show { bucket: String },

    /// Print the statements of a bucket policy
    Statements { bucket: String },

    /// Validate a policy document file and store it as the bucket policy
    Set { bucket: String, file: PathBuf },

    /// Delete the bucket policy
    Delete { bucket: String },

    /// Grant a user read access from a comma separated list of IPs
    GrantRead {
        bucket: String,
        user_id: String,
        allowed_ips: String,
    },

    /// Grant a user write access from a comma separated list of IPs
    GrantWrite {
        bucket: String,
        user_id: String,
        allowed_ips: String,
    },

    /// Deny a user ACL and bucket policy management on a bucket
    DisableAcl { bucket: String, user_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` takes precedence over the `-v` count.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = LocalConfig::load(&cli.config)?;
    let store = connect(&config, cli.user.as_deref()).await?;
    let service = BucketPolicyService::new(store);

    match cli.command {
        Command::Policy(command) => run_policy_command(&service, command).await,
    }
}

async fn connect(config: &LocalConfig, user: Option<&str>) -> Result<S3PolicyStore> {
    match config.resolve_user(user)? {
        Some(credentials) => {
            info!(
                "Connecting to {} as {} ({})",
                config.endpoint, credentials.name, config.region
            );
            Ok(S3PolicyStore::with_static_credentials(
                &config.endpoint,
                &config.region,
                &credentials.access_key,
                &credentials.secret_key,
            ))
        }
        None => {
            info!(
                "Connecting to {} with the default AWS credential chain",
                config.endpoint
            );
            Ok(S3PolicyStore::from_env(Some(&config.endpoint)).await)
        }
    }
}

async fn run_policy_command(
    service: &BucketPolicyService<S3PolicyStore>,
    command: PolicyCommand,
) -> Result<()> {
    match command {
        PolicyCommand::Show { bucket } => {
            match service
                .policy_text(&bucket)
                .await
                .with_context(|| format!("Failed to read policy of bucket {bucket}"))?
            {
                Some(text) => println!("{text}"),
                None => println!("Bucket \"{bucket}\" has no policy"),
            }
        }
        PolicyCommand::Statements { bucket } => {
            let policy = service
                .get_policy(&bucket)
                .await
                .with_context(|| format!("Failed to read policy of bucket {bucket}"))?;
            print!("{}", PolicyListing(&policy));
        }
        PolicyCommand::Set { bucket, file } => {
            let text = read_policy_file(&file).await?;
            let policy = service
                .put_policy(&bucket, &text)
                .await
                .with_context(|| format!("Failed to set policy of bucket {bucket}"))?;
            debug!("Stored {} statements", policy.statements.len());
            println!("Bucket policy successfully created");
        }
        PolicyCommand::Delete { bucket } => {
            service
                .remove_policy(&bucket)
                .await
                .with_context(|| format!("Failed to remove policy of bucket {bucket}"))?;
            println!("Bucket policy successfully removed!");
        }
        PolicyCommand::GrantRead {
            bucket,
            user_id,
            allowed_ips,
        } => {
            let inserted = service
                .grant_read(&bucket, &user_id, &allowed_ips)
                .await
                .with_context(|| format!("Error applying read policy to bucket {bucket}"))?;
            report_insert(inserted, "Read access", &bucket, &user_id);
        }
        PolicyCommand::GrantWrite {
            bucket,
            user_id,
            allowed_ips,
        } => {
            let inserted = service
                .grant_write(&bucket, &user_id, &allowed_ips)
                .await
                .with_context(|| format!("Error applying write policy to bucket {bucket}"))?;
            report_insert(inserted, "Write access", &bucket, &user_id);
        }
        PolicyCommand::DisableAcl { bucket, user_id } => {
            let inserted = service
                .add_acl_deny_statement(&bucket, &user_id)
                .await
                .with_context(|| format!("Error disabling ACLs on bucket {bucket}"))?;
            report_insert(inserted, "ACL lockout", &bucket, &user_id);
        }
    }
    Ok(())
}

async fn read_policy_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read policy file: {}", path.display()))
}

fn report_insert(inserted: bool, what: &str, bucket: &str, user_id: &str) {
    if inserted {
        println!("{what} for {user_id} added to bucket {bucket}");
    } else {
        println!("{what} for {user_id} already present on bucket {bucket}, policy unchanged");
    }
}
