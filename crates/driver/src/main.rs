// CLI modules
mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Access, Bucket, Health, Serve, Version};

command_enum! {
    (Access, Access),
    (Bucket, Bucket),
    (Health, Health),
    (Serve, Serve),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let ctx = cli::op::OpContext::new(args.remote).context("failed to create API client")?;
    let output = args.command.execute(&ctx).await?;
    println!("{}", output);
    Ok(())
}
