//! zaractl - drive the Zara router from the command line.
//!
//! Builds the router in-process: probe, act, print the envelope.

mod cli;

use anyhow::Result;
use clap::Parser;
use console::style;

use zara_common::{ActionRequest, ActionResult};
use zarad::config::ZaraConfig;
use zarad::llm::CompletionClient;
use zarad::router::ZaraRouter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ZaraConfig::load_from(path),
        None => ZaraConfig::load(),
    };

    match cli.command {
        Commands::Status { json } => {
            let router = ZaraRouter::initialize(config).await;
            if json {
                let table = router.capabilities().await;
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                println!("{}", router.status_report().await);
            }
        }

        Commands::Listen { timeout } => {
            let router = ZaraRouter::initialize(config).await;
            let result = router
                .execute(ActionRequest::Listen {
                    timeout_secs: timeout,
                })
                .await;
            print_result(&result);
        }

        Commands::Say { message } => {
            let router = ZaraRouter::initialize(config).await;
            let result = router.execute(ActionRequest::Speak { message }).await;
            print_result(&result);
        }

        Commands::Visual { expression } => {
            let router = ZaraRouter::initialize(config).await;
            let result = router.execute(ActionRequest::Visual { expression }).await;
            print_result(&result);
        }

        Commands::Gesture => {
            let router = ZaraRouter::initialize(config).await;
            let result = router.execute(ActionRequest::Gesture).await;
            print_result(&result);
        }

        Commands::Doctor => {
            let router = ZaraRouter::initialize(config).await;
            println!("{}", router.status_report().await);
            let results = router.self_test().await;
            for (action, result) in &results {
                let mark = if result.success {
                    style("ok").green()
                } else {
                    style("failed").red()
                };
                println!(
                    "  {} {} via {} - {}",
                    mark, action, result.method_used, result.message
                );
            }
            let healthy = results.iter().filter(|(_, r)| r.success).count();
            println!("{}/{} actions healthy", healthy, results.len());
        }

        Commands::Ask { prompt } => {
            let client = CompletionClient::new(&config.llm)?;
            match client.complete(&prompt).await {
                Ok(answer) => println!("{answer}"),
                Err(e) => {
                    eprintln!("{} {}", style("model unreachable:").yellow(), e);
                    println!("{}", CompletionClient::fallback_line());
                }
            }
        }
    }

    Ok(())
}

fn print_result(result: &ActionResult) {
    let mark = if result.success {
        style("ok").green()
    } else {
        style("failed").red()
    };
    println!("{} via {}: {}", mark, result.method_used, result.message);
    match serde_json::to_string(&result.data) {
        Ok(data) => println!("data: {data}"),
        Err(_) => println!("data: <unprintable>"),
    }
}
