//! Pretty output formatting.

use quotes_core::quote::{PartialQuote, Quote};
use quotes_core::serde::format_timestamp;

const TEXT_PREVIEW: usize = 80;

fn preview(text: &str) -> String {
    if text.chars().count() <= TEXT_PREVIEW {
        return text.to_string();
    }
    let cut: String = text.chars().take(TEXT_PREVIEW).collect();
    format!("{}...", cut.trim_end())
}

/// Format a quote for display.
pub fn format_quote(quote: &Quote) -> String {
    let mut output = format!(
        "\"{}\"\n  ID: {}\n  Author: {} ({})\n  Locale: {}_{}\n  Source: {}{}\n  Last found: {}",
        preview(&quote.text),
        quote.id,
        quote.author.name,
        quote.author.id,
        quote.country,
        quote.lang,
        quote.source.host,
        quote.source.path,
        format_timestamp(&quote.last_found_at),
    );
    if !quote.topics.is_empty() {
        let topics: Vec<String> = quote
            .topics
            .iter()
            .map(|topic| format!("{} [{}]", topic.name, topic.relation()))
            .collect();
        output.push_str(&format!("\n  Topics: {}", topics.join(", ")));
    }
    if let Some(views) = quote.count_views {
        output.push_str(&format!("\n  Views: {}", views));
    }
    output
}

/// Format quotes for display.
pub fn format_quotes(quotes: &[Quote]) -> String {
    if quotes.is_empty() {
        return "No quotes found.".to_string();
    }
    let mut output = format!("QUOTES ({})\n", quotes.len());
    output.push_str(&"-".repeat(40));
    for quote in quotes {
        output.push_str(&format!("\n{}", format_quote(quote)));
        output.push('\n');
    }
    output
}

/// Format a projected quote: one line per present attribute.
pub fn format_partial_quote(partial: &PartialQuote) -> String {
    let mut output = format!("ID: {}", partial.id);
    if let Some(author) = &partial.author {
        output.push_str(&format!("\n  Author: {} ({})", author.name, author.id));
    }
    if let Some(country) = &partial.country {
        output.push_str(&format!("\n  Country: {}", country));
    }
    if let Some(lang) = &partial.lang {
        output.push_str(&format!("\n  Lang: {}", lang));
    }
    if let Some(source) = &partial.source {
        output.push_str(&format!("\n  Source: {}{}", source.host, source.path));
    }
    if let Some(text) = &partial.text {
        output.push_str(&format!("\n  Text: {}", preview(text)));
    }
    if let Some(topics) = &partial.topics {
        let names: Vec<&str> = topics.iter().map(|t| t.name.as_str()).collect();
        output.push_str(&format!("\n  Topics: {}", names.join(", ")));
    }
    if let Some(views) = partial.count_views {
        output.push_str(&format!("\n  Views: {}", views));
    }
    if let Some(created_at) = &partial.created_at {
        output.push_str(&format!("\n  Created: {}", format_timestamp(created_at)));
    }
    if let Some(last_found_at) = &partial.last_found_at {
        output.push_str(&format!("\n  Last found: {}", format_timestamp(last_found_at)));
    }
    if let Some(expires_at) = partial.expires_at {
        output.push_str(&format!("\n  Expires: {}", expires_at));
    }
    output
}

pub fn format_count(label: &str, count: usize) -> String {
    format!("{}: {}", label, count)
}
