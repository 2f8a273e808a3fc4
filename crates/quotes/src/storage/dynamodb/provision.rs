//! Table provisioning: pure plan calculation, then execution against DynamoDB.

use std::time::Duration;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, CreateGlobalSecondaryIndexAction, GlobalSecondaryIndex,
    GlobalSecondaryIndexUpdate, KeySchemaElement, KeyType, Projection, ScalarAttributeType,
    TimeToLiveSpecification,
};
use aws_sdk_dynamodb::Client;
use quotes_core::storage::{RepositoryError, Result};

use super::client;
use super::error::map_provisioning_error;
use super::schema::{self, GsiConfig, KeyAttribute, TableConfig};

const ACTIVATION_ATTEMPTS: u32 = 60;
const ACTIVATION_DELAY: Duration = Duration::from_secs(2);

/// Current state of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub status: TableStatus,
    pub gsis: Vec<GsiState>,
    pub ttl_attribute: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsiState {
    pub name: String,
    pub status: GsiStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GsiStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

impl TableState {
    fn is_ready(&self) -> bool {
        self.status == TableStatus::Active && self.gsis.iter().all(|g| g.status == GsiStatus::Active)
    }
}

/// Planned changes for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployPlan {
    /// Table doesn't exist and will be created.
    CreateTable { config: TableConfig },
    /// Table exists but lacks indexes or expiry.
    UpdateTable {
        table_name: String,
        gsis_to_add: Vec<GsiConfig>,
        enable_ttl: Option<String>,
    },
    NoChanges { table_name: String },
}

/// Plan for destroying a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyPlan {
    DeleteTable { table_name: String },
    AlreadyGone { table_name: String },
}

/// Calculates the changes needed to reach the desired table.
pub fn calculate_deploy_plan(current: Option<&TableState>, desired: &TableConfig) -> DeployPlan {
    let Some(state) = current else {
        return DeployPlan::CreateTable {
            config: desired.clone(),
        };
    };

    let gsis_to_add: Vec<GsiConfig> = desired
        .gsis
        .iter()
        .filter(|gsi| !state.gsis.iter().any(|g| g.name == gsi.name))
        .cloned()
        .collect();

    let enable_ttl = match (&desired.ttl_attribute, &state.ttl_attribute) {
        (Some(wanted), Some(current)) if wanted == current => None,
        (Some(wanted), _) => Some(wanted.clone()),
        (None, _) => None,
    };

    if gsis_to_add.is_empty() && enable_ttl.is_none() {
        DeployPlan::NoChanges {
            table_name: desired.table_name.clone(),
        }
    } else {
        DeployPlan::UpdateTable {
            table_name: desired.table_name.clone(),
            gsis_to_add,
            enable_ttl,
        }
    }
}

pub fn calculate_destroy_plan(current: Option<&TableState>, table_name: &str) -> DestroyPlan {
    match current {
        Some(_) => DestroyPlan::DeleteTable {
            table_name: table_name.to_string(),
        },
        None => DestroyPlan::AlreadyGone {
            table_name: table_name.to_string(),
        },
    }
}

/// Formats a deploy plan for display.
pub fn format_deploy_plan(plan: &DeployPlan) -> Vec<String> {
    match plan {
        DeployPlan::CreateTable { config } => {
            let mut lines = vec![
                format!("+ Create table: {}", config.table_name),
                format!("  Partition key: {} (S)", config.partition_key.name),
            ];
            if let Some(sk) = &config.sort_key {
                lines.push(format!("  Sort key: {} (S)", sk.name));
            }
            for gsi in &config.gsis {
                lines.push(format!("  + GSI: {}", gsi.name));
                lines.push(format!("    Partition key: {} (S)", gsi.partition_key.name));
                if let Some(sk) = &gsi.sort_key {
                    lines.push(format!("    Sort key: {} (S)", sk.name));
                }
            }
            if let Some(ttl) = &config.ttl_attribute {
                lines.push(format!("  TTL: {}", ttl));
            }
            lines.push("  Billing: PAY_PER_REQUEST".to_string());
            lines
        }
        DeployPlan::UpdateTable {
            table_name,
            gsis_to_add,
            enable_ttl,
        } => {
            let mut lines = vec![format!("~ Update table: {}", table_name)];
            for gsi in gsis_to_add {
                lines.push(format!("  + Add GSI: {}", gsi.name));
            }
            if let Some(ttl) = enable_ttl {
                lines.push(format!("  + Enable TTL on: {}", ttl));
            }
            lines
        }
        DeployPlan::NoChanges { table_name } => {
            vec![format!("= Table '{}' is up to date", table_name)]
        }
    }
}

pub fn format_destroy_plan(plan: &DestroyPlan) -> Vec<String> {
    match plan {
        DestroyPlan::DeleteTable { table_name } => {
            vec![format!(
                "- Delete table: {} (ALL DATA WILL BE LOST)",
                table_name
            )]
        }
        DestroyPlan::AlreadyGone { table_name } => {
            vec![format!("= Table '{}' does not exist", table_name)]
        }
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Reads the table state and plans a deployment of the quotes table.
pub async fn plan_deploy(client: &Client, table_name: &str) -> Result<DeployPlan> {
    let current = client::get_table_state(client, table_name).await?;
    Ok(calculate_deploy_plan(
        current.as_ref(),
        &schema::quotes_table_config(table_name),
    ))
}

pub async fn plan_destroy(client: &Client, table_name: &str) -> Result<DestroyPlan> {
    let current = client::get_table_state(client, table_name).await?;
    Ok(calculate_destroy_plan(current.as_ref(), table_name))
}

/// Brings the quotes table up to date. Safe to call when it already is.
pub async fn deploy(client: &Client, table_name: &str) -> Result<()> {
    let plan = plan_deploy(client, table_name).await?;
    execute_deploy_plan(client, &plan).await
}

pub async fn destroy(client: &Client, table_name: &str) -> Result<()> {
    let plan = plan_destroy(client, table_name).await?;
    execute_destroy_plan(client, &plan).await
}

pub async fn execute_deploy_plan(client: &Client, plan: &DeployPlan) -> Result<()> {
    match plan {
        DeployPlan::CreateTable { config } => {
            tracing::info!(table = %config.table_name, "Creating table");
            create_table(client, config).await?;
            wait_for_table_active(client, &config.table_name).await?;
            if let Some(ttl) = &config.ttl_attribute {
                enable_ttl(client, &config.table_name, ttl).await?;
            }
        }
        DeployPlan::UpdateTable {
            table_name,
            gsis_to_add,
            enable_ttl: ttl,
        } => {
            for gsi in gsis_to_add {
                tracing::info!(table = %table_name, gsi = %gsi.name, "Adding index");
                add_gsi(client, table_name, gsi).await?;
                wait_for_table_active(client, table_name).await?;
            }
            if let Some(ttl) = ttl {
                enable_ttl(client, table_name, ttl).await?;
            }
        }
        DeployPlan::NoChanges { table_name } => {
            tracing::debug!(table = %table_name, "Table is up to date");
        }
    }
    Ok(())
}

pub async fn execute_destroy_plan(client: &Client, plan: &DestroyPlan) -> Result<()> {
    if let DestroyPlan::DeleteTable { table_name } = plan {
        tracing::info!(table = %table_name, "Deleting table");
        client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_provisioning_error("DeleteTable", e))?;
    }
    Ok(())
}

fn key_schema(
    partition_key: &KeyAttribute,
    sort_key: Option<&KeyAttribute>,
) -> Result<Vec<KeySchemaElement>> {
    let mut elements = vec![(partition_key, KeyType::Hash)];
    if let Some(sk) = sort_key {
        elements.push((sk, KeyType::Range));
    }
    elements
        .into_iter()
        .map(|(attribute, key_type)| {
            KeySchemaElement::builder()
                .attribute_name(&attribute.name)
                .key_type(key_type)
                .build()
                .map_err(|e| map_provisioning_error("KeySchemaElement", e))
        })
        .collect()
}

fn attribute_definition(attribute: &KeyAttribute) -> Result<AttributeDefinition> {
    let attribute_type = match attribute.attribute_type {
        schema::AttributeType::String => ScalarAttributeType::S,
    };
    AttributeDefinition::builder()
        .attribute_name(&attribute.name)
        .attribute_type(attribute_type)
        .build()
        .map_err(|e| map_provisioning_error("AttributeDefinition", e))
}

fn projection(projection: &schema::ProjectionType) -> Projection {
    let projection_type = match projection {
        schema::ProjectionType::All => aws_sdk_dynamodb::types::ProjectionType::All,
    };
    Projection::builder().projection_type(projection_type).build()
}

fn billing_mode(mode: schema::BillingMode) -> aws_sdk_dynamodb::types::BillingMode {
    match mode {
        schema::BillingMode::PayPerRequest => aws_sdk_dynamodb::types::BillingMode::PayPerRequest,
    }
}

async fn create_table(client: &Client, config: &TableConfig) -> Result<()> {
    let attribute_definitions = config
        .key_attributes()
        .into_iter()
        .map(attribute_definition)
        .collect::<Result<Vec<_>>>()?;

    let mut request = client
        .create_table()
        .table_name(&config.table_name)
        .set_key_schema(Some(key_schema(
            &config.partition_key,
            config.sort_key.as_ref(),
        )?))
        .set_attribute_definitions(Some(attribute_definitions))
        .billing_mode(billing_mode(config.billing_mode));

    for gsi in &config.gsis {
        request = request.global_secondary_indexes(
            GlobalSecondaryIndex::builder()
                .index_name(&gsi.name)
                .set_key_schema(Some(key_schema(&gsi.partition_key, gsi.sort_key.as_ref())?))
                .projection(projection(&gsi.projection))
                .build()
                .map_err(|e| map_provisioning_error("GlobalSecondaryIndex", e))?,
        );
    }

    request
        .send()
        .await
        .map_err(|e| map_provisioning_error("CreateTable", e))?;
    Ok(())
}

async fn add_gsi(client: &Client, table_name: &str, gsi: &GsiConfig) -> Result<()> {
    let mut attribute_definitions = vec![attribute_definition(&gsi.partition_key)?];
    if let Some(sk) = &gsi.sort_key {
        attribute_definitions.push(attribute_definition(sk)?);
    }

    client
        .update_table()
        .table_name(table_name)
        .set_attribute_definitions(Some(attribute_definitions))
        .global_secondary_index_updates(
            GlobalSecondaryIndexUpdate::builder()
                .create(
                    CreateGlobalSecondaryIndexAction::builder()
                        .index_name(&gsi.name)
                        .set_key_schema(Some(key_schema(&gsi.partition_key, gsi.sort_key.as_ref())?))
                        .projection(projection(&gsi.projection))
                        .build()
                        .map_err(|e| map_provisioning_error("CreateGlobalSecondaryIndexAction", e))?,
                )
                .build(),
        )
        .send()
        .await
        .map_err(|e| map_provisioning_error("UpdateTable", e))?;

    Ok(())
}

async fn enable_ttl(client: &Client, table_name: &str, attribute: &str) -> Result<()> {
    tracing::info!(table = %table_name, attribute, "Enabling TTL");
    client
        .update_time_to_live()
        .table_name(table_name)
        .time_to_live_specification(
            TimeToLiveSpecification::builder()
                .attribute_name(attribute)
                .enabled(true)
                .build()
                .map_err(|e| map_provisioning_error("TimeToLiveSpecification", e))?,
        )
        .send()
        .await
        .map_err(|e| map_provisioning_error("UpdateTimeToLive", e))?;
    Ok(())
}

async fn wait_for_table_active(client: &Client, table_name: &str) -> Result<()> {
    for _ in 0..ACTIVATION_ATTEMPTS {
        if let Some(state) = client::get_table_state(client, table_name).await? {
            if state.is_ready() {
                return Ok(());
            }
        }
        tokio::time::sleep(ACTIVATION_DELAY).await;
    }

    Err(RepositoryError::Unavailable(format!(
        "Timed out waiting for table '{}' to become active",
        table_name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::dynamodb::schema::quotes_table_config;

    fn active_state(gsis: &[&str], ttl: Option<&str>) -> TableState {
        TableState {
            status: TableStatus::Active,
            gsis: gsis
                .iter()
                .map(|name| GsiState {
                    name: name.to_string(),
                    status: GsiStatus::Active,
                })
                .collect(),
            ttl_attribute: ttl.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_table_is_created() {
        let desired = quotes_table_config("quotes");
        let plan = calculate_deploy_plan(None, &desired);

        assert_eq!(plan, DeployPlan::CreateTable { config: desired });
    }

    #[test]
    fn test_complete_table_needs_no_changes() {
        let state = active_state(&["GSI1", "GSI2"], Some("expiresAt"));
        let plan = calculate_deploy_plan(Some(&state), &quotes_table_config("quotes"));

        assert_eq!(
            plan,
            DeployPlan::NoChanges {
                table_name: "quotes".to_string()
            }
        );
    }

    #[test]
    fn test_missing_gsi_and_ttl_are_added() {
        let state = active_state(&["GSI1"], None);
        let plan = calculate_deploy_plan(Some(&state), &quotes_table_config("quotes"));

        match plan {
            DeployPlan::UpdateTable {
                gsis_to_add,
                enable_ttl,
                ..
            } => {
                assert_eq!(gsis_to_add.len(), 1);
                assert_eq!(gsis_to_add[0].name, "GSI2");
                assert_eq!(enable_ttl.as_deref(), Some("expiresAt"));
            }
            other => panic!("unexpected plan: {:?}", other),
        }
    }

    #[test]
    fn test_destroy_plan() {
        let state = active_state(&[], None);
        assert_eq!(
            calculate_destroy_plan(Some(&state), "quotes"),
            DestroyPlan::DeleteTable {
                table_name: "quotes".to_string()
            }
        );
        assert_eq!(
            calculate_destroy_plan(None, "quotes"),
            DestroyPlan::AlreadyGone {
                table_name: "quotes".to_string()
            }
        );
    }

    #[test]
    fn test_format_create_plan() {
        let plan = DeployPlan::CreateTable {
            config: quotes_table_config("quotes"),
        };
        let lines = format_deploy_plan(&plan);

        assert_eq!(lines[0], "+ Create table: quotes");
        assert!(lines.contains(&"  + GSI: GSI2".to_string()));
        assert!(lines.contains(&"  TTL: expiresAt".to_string()));
    }

    #[test]
    fn test_format_destroy_plan() {
        let lines = format_destroy_plan(&DestroyPlan::AlreadyGone {
            table_name: "quotes".to_string(),
        });
        assert_eq!(lines, vec!["= Table 'quotes' does not exist".to_string()]);
    }

    #[test]
    fn test_table_readiness() {
        let mut state = active_state(&["GSI1"], None);
        assert!(state.is_ready());

        state.gsis[0].status = GsiStatus::Creating;
        assert!(!state.is_ready());
    }
}
