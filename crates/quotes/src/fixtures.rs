//! Quotes shared by the test modules.

use chrono::{DateTime, Duration, TimeZone, Utc};
use quotes_core::quote::{
    NewQuote, Quote, QuoteAuthor, QuoteSource, Topic, TopicRelation, TopicType,
};

pub fn found_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
}

pub fn source() -> QuoteSource {
    QuoteSource::new("protv.md", "/stiri/politic", "news1", "Declaratie")
}

/// A Moldovan quote by `qtopic1` naming itself as primary topic and mentioning `qtopic2`.
pub fn sample_quote() -> Quote {
    NewQuote::new(
        QuoteAuthor::new("qtopic1", "Vlad Filat"),
        "md",
        "ro",
        source(),
        "Vom continua reformele.",
    )
    .with_topic(
        Topic::new("qtopic1", "Vlad Filat")
            .with_slug("vlad-filat")
            .with_type(TopicType::Person),
    )
    .with_topic(
        Topic::new("qtopic2", "Chisinau")
            .with_type(TopicType::Place)
            .with_rel(TopicRelation::Mention),
    )
    .with_count_views(3)
    .into_quote(found_at(), Duration::days(180))
}

/// A topic-less quote found at `at`.
pub fn quote_at(country: &str, lang: &str, author_id: &str, text: &str, at: DateTime<Utc>) -> Quote {
    NewQuote::new(
        QuoteAuthor::new(author_id, author_id.to_uppercase()),
        country,
        lang,
        source(),
        text,
    )
    .into_quote(at, Duration::days(180))
}
