use clap::Parser;
use record_gateway::config::read_record;
use record_gateway::utils::error::ErrorCategory;
use record_gateway::utils::logger;
use record_gateway::{CliConfig, Command, GatewayError, RecordGateway};

fn exit_code(e: &GatewayError) -> i32 {
    match e.category() {
        ErrorCategory::Configuration => 1,
        ErrorCategory::Network | ErrorCategory::Remote => 2,
        ErrorCategory::Data => 3,
    }
}

// Logs go to stderr; stdout carries only the JSON rows.
fn fail(e: GatewayError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    std::process::exit(exit_code(&e));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting record-gateway CLI");

    let gateway = match config
        .credentials()
        .and_then(|credentials| RecordGateway::connect(&credentials))
    {
        Ok(gateway) => gateway,
        Err(e) => fail(e),
    };

    let rows = match &config.command {
        Command::List => gateway.try_fetch_all().await,
        Command::Insert { data, file } => match read_record(data.as_deref(), file.as_deref()) {
            Ok(record) => gateway.try_insert_one(&record).await,
            Err(e) => fail(e),
        },
    };

    match rows {
        Ok(rows) => {
            tracing::info!("✅ {} record(s)", rows.len());
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Err(e) => fail(e),
    }

    Ok(())
}
