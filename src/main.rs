//! harness-listings CLI entrypoint.
//!
//! This is the main entrypoint for the harness-listings command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use harness_listings::cli::{Cli, Commands, OutputFormatter};
use harness_listings::config::{
    ConfigParser, ConfigValidator, MarketplaceSettings, MediaSettings, ProductConfig,
    find_config_file,
};
use harness_listings::error::{ConfigError, Result};
use harness_listings::listing::ListingPayloadBuilder;
use harness_listings::marketplace::SpApiClient;
use harness_listings::media::S3ImageUploader;
use harness_listings::workflow::ListingWorkflow;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.output);
    let config = cli.config.as_ref();

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Validate { warnings } => cmd_validate(config, warnings, &formatter).await,
        Commands::Create { dry_run } => cmd_create(config, dry_run, &formatter).await,
        Commands::Update { yes, dry_run } => cmd_update(config, yes, dry_run, &formatter).await,
        Commands::Diff => cmd_diff(config, &formatter).await,
        Commands::Get { sku } => cmd_get(&sku, &formatter).await,
        Commands::Delete { sku, yes } => cmd_delete(&sku, yes, &formatter).await,
        Commands::List { page_size } => cmd_list(page_size, &formatter).await,
    }
}

/// Write a starter configuration.
fn cmd_init(path: &Path, force: bool) -> Result<ExitCode> {
    info!("Initializing listing project in: {}", path.display());

    let config_path = path.join("product.yaml");
    let env_path = path.join(".env.example");
    let gitignore_path = path.join(".gitignore");

    if !force && config_path.exists() {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    std::fs::create_dir_all(path.join("images"))?;

    std::fs::write(&config_path, include_str!("../templates/product.yaml"))?;
    eprintln!("Created: {}", config_path.display());

    std::fs::write(&env_path, include_str!("../templates/.env.example"))?;
    eprintln!("Created: {}", env_path.display());

    if gitignore_path.exists() {
        let existing = std::fs::read_to_string(&gitignore_path)?;
        if !existing.lines().any(|l| l.trim() == ".env") {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            writeln!(file, "\n# harness-listings\n.env")?;
            eprintln!("Updated: {}", gitignore_path.display());
        }
    } else {
        std::fs::write(&gitignore_path, ".env\n")?;
        eprintln!("Created: {}", gitignore_path.display());
    }

    eprintln!("\nProject initialized successfully!");
    eprintln!("Next steps:");
    eprintln!("  1. Copy .env.example to .env and fill in your SP-API credentials");
    eprintln!("  2. Edit product.yaml and put your photos under images/");
    eprintln!("  3. Run 'harness-listings validate' to check the configuration");
    eprintln!("  4. Run 'harness-listings create' to publish the listing");

    Ok(ExitCode::SUCCESS)
}

/// Validate configuration.
async fn cmd_validate(
    config_path: Option<&PathBuf>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let config_file = resolve_config_path(config_path)?;
    info!("Validating configuration: {}", config_file.display());

    let parser = parser_for(&config_file);
    let document = parser.load_file(&config_file)?;
    let result = ConfigValidator::new()
        .with_base_dir(parser.base_dir())
        .validate(&document)
        .await;

    println!("{}", formatter.format_validation(&result, show_warnings));

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Create the listing.
async fn cmd_create(
    config_path: Option<&PathBuf>,
    dry_run: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let (config, base_dir) = load_validated_config(config_path, formatter).await?;
    let (client, uploader) = connect().await?;

    let workflow = ListingWorkflow::new(&client, uploader.as_ref(), payload_builder(&client))
        .with_dry_run(dry_run);
    let outcome = workflow.create(&config, &base_dir).await?;

    println!("{}", formatter.format_create(&outcome));
    Ok(ExitCode::SUCCESS)
}

/// Patch the published listing.
async fn cmd_update(
    config_path: Option<&PathBuf>,
    auto_approve: bool,
    dry_run: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let (config, base_dir) = load_validated_config(config_path, formatter).await?;
    let (client, uploader) = connect().await?;

    let workflow = ListingWorkflow::new(&client, uploader.as_ref(), payload_builder(&client))
        .with_dry_run(dry_run);

    let changes = workflow.preview_changes(&config).await?;
    if changes.is_empty() {
        println!("{}", formatter.format_changes(config.sku(), &changes));
        return Ok(ExitCode::SUCCESS);
    }

    if !auto_approve && !dry_run {
        eprintln!("{}", formatter.format_changes(config.sku(), &changes));
        if !confirm("Do you want to apply these changes? [y/N]: ", "y")? {
            eprintln!("Update cancelled.");
            return Ok(ExitCode::FAILURE);
        }
    }

    let outcome = workflow.apply_changes(&config, &base_dir, changes).await?;
    println!("{}", formatter.format_update(&outcome));
    Ok(ExitCode::SUCCESS)
}

/// Show differences with the published listing.
async fn cmd_diff(config_path: Option<&PathBuf>, formatter: &OutputFormatter) -> Result<ExitCode> {
    let (config, _) = load_validated_config(config_path, formatter).await?;
    let client = marketplace_client()?;

    let workflow =
        ListingWorkflow::<_, S3ImageUploader>::new(&client, None, payload_builder(&client));
    let changes = workflow.preview_changes(&config).await?;

    println!("{}", formatter.format_changes(config.sku(), &changes));
    Ok(ExitCode::SUCCESS)
}

/// Show a published listing.
async fn cmd_get(sku: &str, formatter: &OutputFormatter) -> Result<ExitCode> {
    ConfigParser::new().load_dotenv()?;
    let client = marketplace_client()?;

    let workflow =
        ListingWorkflow::<_, S3ImageUploader>::new(&client, None, payload_builder(&client));
    let listing = workflow.fetch(sku).await?;

    println!("{}", formatter.format_listing(sku, &listing));
    Ok(ExitCode::SUCCESS)
}

/// Delete a published listing.
async fn cmd_delete(
    sku: &str,
    auto_approve: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    ConfigParser::new().load_dotenv()?;
    let client = marketplace_client()?;

    if !auto_approve {
        eprint!("\nListing {sku} will be removed from the marketplace.");
        if !confirm(" Type the SKU to confirm: ", sku)? {
            eprintln!("Deletion cancelled.");
            return Ok(ExitCode::FAILURE);
        }
    }

    let workflow =
        ListingWorkflow::<_, S3ImageUploader>::new(&client, None, payload_builder(&client));
    let submission = workflow.delete(sku).await?;

    println!("{}", formatter.format_deleted(sku, submission.as_ref()));
    Ok(ExitCode::SUCCESS)
}

/// List the seller's listings.
async fn cmd_list(page_size: u32, formatter: &OutputFormatter) -> Result<ExitCode> {
    ConfigParser::new().load_dotenv()?;
    let client = marketplace_client()?;

    let workflow =
        ListingWorkflow::<_, S3ImageUploader>::new(&client, None, payload_builder(&client));
    let listings = workflow.list(page_size).await?;

    println!("{}", formatter.format_listings(&listings));
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Parser rooted at the configuration file's directory.
fn parser_for(config_file: &Path) -> ConfigParser {
    ConfigParser::new().with_base_path(config_file.parent().unwrap_or_else(|| Path::new(".")))
}

/// Loads and validates the configuration, refusing invalid documents.
async fn load_validated_config(
    config_path: Option<&PathBuf>,
    formatter: &OutputFormatter,
) -> Result<(ProductConfig, PathBuf)> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let parser = parser_for(&config_file);
    parser.load_dotenv()?;

    let document = parser.load_file(&config_file)?;
    let result = ConfigValidator::new()
        .with_base_dir(parser.base_dir())
        .validate(&document)
        .await;

    if !result.is_valid() {
        eprintln!("{}", formatter.format_validation(&result, false));
        return Err(ConfigError::ValidationFailed {
            count: result.error_count(),
            first: result
                .errors
                .first()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
        .into());
    }
    for warning in &result.warnings {
        warn!("{warning}");
    }

    Ok((ProductConfig::from_document(&document)?, parser.base_dir()))
}

/// Creates the marketplace client from the environment.
fn marketplace_client() -> Result<SpApiClient> {
    SpApiClient::new(MarketplaceSettings::from_env()?)
}

/// Creates the marketplace client and, when a bucket is configured, the
/// image uploader.
async fn connect() -> Result<(SpApiClient, Option<S3ImageUploader>)> {
    let client = marketplace_client()?;

    let media = MediaSettings::from_env();
    let uploader = if media.bucket.is_some() {
        Some(S3ImageUploader::new(&media).await?)
    } else {
        debug!("No image bucket configured");
        None
    };

    Ok((client, uploader))
}

/// Payload builder for the client's marketplace.
fn payload_builder(client: &SpApiClient) -> ListingPayloadBuilder {
    ListingPayloadBuilder::new(client.marketplace_id(), client.currency())
}

/// Asks for confirmation on stderr. Returns true if the answer matches.
fn confirm(prompt: &str, expected: &str) -> Result<bool> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case(expected))
}
