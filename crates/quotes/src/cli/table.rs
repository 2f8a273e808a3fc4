//! `quotes table`: deploy or destroy the quotes table.

use anyhow::{bail, Context, Result};
use aws_sdk_dynamodb::Client;
use dialoguer::Confirm;

use super::prelude::*;
use crate::storage::dynamodb::provision::{self, DeployPlan, DestroyPlan};

#[derive(Debug, clap::Parser)]
pub struct TableCommand {
    #[command(subcommand)]
    pub action: TableAction,
}

#[derive(Debug, clap::Subcommand)]
pub enum TableAction {
    /// Create the table or add what it is missing (indexes, TTL).
    #[command(long_about = "Create or update the quotes table.

Shows a plan of changes before applying and asks for confirmation.

Environment variables:
  AWS_ENDPOINT_URL    - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION          - AWS region (defaults to us-east-1)
  AWS_PROFILE         - AWS profile to use for credentials")]
    Deploy {
        /// Skip confirmation prompts.
        #[arg(long)]
        force: bool,
    },
    /// Delete the table and every quote in it.
    Destroy {
        /// Skip confirmation prompts.
        #[arg(long)]
        force: bool,
    },
}

fn confirm(prompt: &str, default: bool) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .context("Could not read confirmation")?;

    if !confirmed {
        bail!("Cancelled by user");
    }
    Ok(())
}

pub async fn run(command: TableCommand, client: &Client, table_name: &str) -> Result<()> {
    match command.action {
        TableAction::Deploy { force } => deploy(client, table_name, force).await,
        TableAction::Destroy { force } => destroy(client, table_name, force).await,
    }
}

async fn deploy(client: &Client, table_name: &str, force: bool) -> Result<()> {
    let plan = provision::plan_deploy(client, table_name).await?;

    aprintln!("{}", p_c("Deploy Plan:"));
    for line in provision::format_deploy_plan(&plan) {
        aprintln!("  {}", plan_line(&line));
    }
    aprintln!();

    if matches!(plan, DeployPlan::NoChanges { .. }) {
        aprintln!("{}", p_g("Table is up to date."));
        return Ok(());
    }

    if !force {
        confirm("Apply these changes?", true)?;
    }

    aprintln!("{}", p_b("Applying changes..."));
    provision::execute_deploy_plan(client, &plan).await?;
    aprintln!("{}", p_g("Table deployed successfully."));

    Ok(())
}

async fn destroy(client: &Client, table_name: &str, force: bool) -> Result<()> {
    let plan = provision::plan_destroy(client, table_name).await?;

    aprintln!("{}", p_y("Destroy Plan:"));
    for line in provision::format_destroy_plan(&plan) {
        aprintln!("  {}", p_r(&line));
    }
    aprintln!();

    if matches!(plan, DestroyPlan::AlreadyGone { .. }) {
        aprintln!("{}", p_g("Nothing to destroy."));
        return Ok(());
    }

    if !force {
        confirm(
            "Are you sure you want to delete this table? ALL DATA WILL BE LOST",
            false,
        )?;
    }

    aprintln!("{}", p_b("Deleting table..."));
    provision::execute_destroy_plan(client, &plan).await?;
    aprintln!("{}", p_g("Table destroyed successfully."));

    Ok(())
}
