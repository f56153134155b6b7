use aem_admin::app::App;
use aem_admin::services::config::{load_env_file, ConfigService};
use aem_admin::services::logger::Logger;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

/// MCP server exposing AEM admin content operations over stdio.
#[derive(Debug, Parser)]
#[command(name = "aem-admin", version, about)]
struct Cli {
    /// Validate the environment configuration, report the result and exit.
    #[arg(long)]
    check_config: bool,
}

fn check_config(config: &ConfigService) -> i32 {
    let effective = config.effective();
    println!("base_url: {}", effective.base_url);
    println!("timeout_ms: {}", effective.timeout_ms);
    println!(
        "authenticated: {}",
        config.credentials().is_authenticated()
    );
    if let Err(err) = url::Url::parse(&effective.base_url) {
        println!("warning: base_url is not an absolute URL ({})", err);
    }
    let errors = config.validate();
    if errors.is_empty() {
        println!("configuration: ok");
        return 0;
    }
    for error in errors {
        println!("error: {}", error);
    }
    1
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let dotenv = load_env_file(Path::new(".env"));
    let logger = Logger::new("aem-admin");
    match dotenv {
        Ok(Some(path)) => logger.debug(
            "Loaded environment file",
            Some(&serde_json::json!({ "path": path.display().to_string() })),
        ),
        Ok(None) => {}
        Err(err) => logger.warn(&err.message, None),
    }
    let config = Arc::new(ConfigService::from_env(logger.clone()));

    if cli.check_config {
        std::process::exit(check_config(&config));
    }

    logger.info("Starting AEM admin MCP server", None);
    let result = match App::initialize(logger.clone(), config) {
        Ok(app) => aem_admin::mcp::server::run_stdio(app).await,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        logger.error(
            "Failed to start server",
            Some(&serde_json::json!({ "error": err.message })),
        );
        eprintln!("aem-admin: {}", err);
        std::process::exit(1);
    }
}
