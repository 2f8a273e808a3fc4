//! CLI command definitions and dispatch.

mod prelude;
pub mod table;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use quotes_core::quote::{
    CountByAuthorParams, CountByTopicParams, CountParams, LatestByAuthorParams,
    LatestByTopicParams, LatestQuotesParams, QuoteField, QuoteUpdate, TopicRelation,
};
use quotes_core::storage::IndexCursor;

use crate::config::Config;
use crate::output::{format_json, pretty, OutputFormat};
use crate::storage::dynamodb::{self, create_client};

/// Inspect and maintain the quotes table.
#[derive(Debug, Parser)]
#[command(name = "quotes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Table holding quotes and their topic index.
    #[arg(long, global = true, env = "QUOTES_TABLE_NAME")]
    pub table_name: Option<String>,

    /// Custom DynamoDB endpoint (e.g., http://localhost:8000).
    #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Paging flags shared by the list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Maximum number of quotes (defaults to QUOTES_DEFAULT_LIMIT).
    #[arg(long)]
    pub limit: Option<usize>,

    /// Resume after the quote last found at this RFC 3339 timestamp.
    #[arg(long, value_name = "TIMESTAMP", requires = "after_id")]
    pub after_at: Option<DateTime<Utc>>,

    /// Id of the quote to resume after.
    #[arg(long, value_name = "ID", requires = "after_at")]
    pub after_id: Option<String>,
}

impl ListArgs {
    fn cursor(&self) -> Option<IndexCursor> {
        match (self.after_at, &self.after_id) {
            (Some(at), Some(id)) => Some(IndexCursor::new(at, id)),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Table provisioning.
    Table(table::TableCommand),
    /// Get a quote, optionally only some of its fields.
    Get {
        id: String,
        /// Comma separated field names (e.g. text,author).
        #[arg(long, value_delimiter = ',')]
        fields: Vec<QuoteField>,
    },
    /// Latest quotes of a locale.
    Latest {
        #[arg(long)]
        country: String,
        #[arg(long)]
        lang: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Latest quotes of an author.
    ByAuthor {
        author_id: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Latest quotes referencing a topic.
    ByTopic {
        topic_id: String,
        /// PRIMARY or MENTION.
        #[arg(long)]
        relation: Option<TopicRelation>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Count the quotes of a locale.
    Count {
        #[arg(long)]
        country: String,
        #[arg(long)]
        lang: String,
    },
    /// Count the quotes of an author.
    CountAuthor { author_id: String },
    /// Count the quotes referencing a topic.
    CountTopic {
        topic_id: String,
        #[arg(long)]
        relation: Option<TopicRelation>,
    },
    /// Mark a quote as found now, extending its expiry.
    Touch { id: String },
    /// Delete a quote.
    Delete { id: String },
}

impl Cli {
    /// Environment configuration with the command line flags applied on top.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::from_env()?;
        if let Some(table_name) = &self.table_name {
            config.table_name = table_name.clone();
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            config.endpoint_url = Some(endpoint_url.clone());
        }
        Ok(config)
    }
}

fn print<T: serde::Serialize>(format: OutputFormat, value: &T, render: impl FnOnce(&T) -> String) {
    match format {
        OutputFormat::Json => println!("{}", format_json(value)),
        OutputFormat::Pretty => println!("{}", render(value)),
    }
}

fn print_count(format: OutputFormat, label: &str, count: usize) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "count": count })),
        OutputFormat::Pretty => println!("{}", pretty::format_count(label, count)),
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.config()?;
    let format = cli.format;
    let limit = |list: &ListArgs| list.limit.unwrap_or(config.default_limit);

    tracing::debug!(
        table = %config.table_name,
        endpoint = ?config.endpoint_url,
        region = %config.region,
        "Using configuration"
    );

    let client = create_client(&config).await;
    let repository = dynamodb::repository(client.clone(), &config.table_name);

    match cli.command {
        Commands::Table(command) => table::run(command, &client, &config.table_name).await?,
        Commands::Get { id, fields } => {
            if fields.is_empty() {
                match repository.get_by_id(&id).await? {
                    Some(quote) => print(format, &quote, pretty::format_quote),
                    None => anyhow::bail!("Quote {} not found", id),
                }
            } else {
                match repository.get_by_id_with_fields(&id, &fields).await? {
                    Some(partial) => print(format, &partial, pretty::format_partial_quote),
                    None => anyhow::bail!("Quote {} not found", id),
                }
            }
        }
        Commands::Latest {
            country,
            lang,
            list,
        } => {
            let mut params = LatestQuotesParams::new(country, lang, limit(&list));
            params.cursor = list.cursor();
            let quotes = repository.latest(params).await?;
            print(format, &quotes, |q| pretty::format_quotes(q));
        }
        Commands::ByAuthor { author_id, list } => {
            let mut params = LatestByAuthorParams::new(author_id, "", "", limit(&list));
            params.cursor = list.cursor();
            let quotes = repository.latest_by_author(params).await?;
            print(format, &quotes, |q| pretty::format_quotes(q));
        }
        Commands::ByTopic {
            topic_id,
            relation,
            list,
        } => {
            let mut params = LatestByTopicParams::new(topic_id, "", "", limit(&list));
            params.cursor = list.cursor();
            params.relation = relation;
            let quotes = repository.latest_by_topic(params).await?;
            print(format, &quotes, |q| pretty::format_quotes(q));
        }
        Commands::Count { country, lang } => {
            let count = repository.count(CountParams::new(country, lang)).await?;
            print_count(format, "Quotes", count);
        }
        Commands::CountAuthor { author_id } => {
            let count = repository
                .count_by_author(CountByAuthorParams::new(author_id, "", ""))
                .await?;
            print_count(format, "Quotes by author", count);
        }
        Commands::CountTopic { topic_id, relation } => {
            let mut params = CountByTopicParams::new(topic_id, "", "");
            params.relation = relation;
            let count = repository.count_by_topic(params).await?;
            print_count(format, "Quotes on topic", count);
        }
        Commands::Touch { id } => {
            let now = Utc::now();
            let update = QuoteUpdate::new(id)
                .set_last_found_at(now)
                .set_expires_at((now + config.quote_ttl()).timestamp());
            let quote = repository.update(update).await?;
            print(format, &quote, pretty::format_quote);
        }
        Commands::Delete { id } => {
            if !repository.delete(&id).await? {
                anyhow::bail!("Quote {} not found", id);
            }
            if format == OutputFormat::Pretty {
                println!("Deleted quote {}", id);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_with_fields() {
        let cli = Cli::try_parse_from(["quotes", "get", "mdro1", "--fields", "text,author"]).unwrap();

        match cli.command {
            Commands::Get { id, fields } => {
                assert_eq!(id, "mdro1");
                assert_eq!(fields, vec![QuoteField::Text, QuoteField::Author]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_by_topic_with_relation_and_cursor() {
        let cli = Cli::try_parse_from([
            "quotes",
            "by-topic",
            "t1",
            "--relation",
            "MENTION",
            "--limit",
            "5",
            "--after-at",
            "2024-06-15T10:30:00.000Z",
            "--after-id",
            "mdro1",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::ByTopic {
                topic_id,
                relation,
                list,
            } => {
                assert_eq!(topic_id, "t1");
                assert_eq!(relation, Some(TopicRelation::Mention));
                assert_eq!(list.limit, Some(5));
                assert_eq!(
                    list.cursor().map(|cursor| cursor.id),
                    Some("mdro1".to_string())
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cursor_needs_both_parts() {
        assert!(Cli::try_parse_from([
            "quotes",
            "latest",
            "--country",
            "md",
            "--lang",
            "ro",
            "--after-id",
            "mdro1",
        ])
        .is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(Cli::try_parse_from(["quotes", "get", "mdro1", "--fields", "nope"]).is_err());
    }

    #[test]
    fn test_table_deploy_parses_force() {
        let cli = Cli::try_parse_from(["quotes", "table", "deploy", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Table(table::TableCommand {
                action: table::TableAction::Deploy { force: true }
            })
        ));
    }
}
