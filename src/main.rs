// src/main.rs
use std::env;

use budget_planner::{backend, cli};
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "server" {
        println!("Starting Backend Server...");
        backend::run_server().await?;
    } else {
        cli::run().await?;
    }
    Ok(())
}
