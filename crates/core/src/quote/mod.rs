//! The quote domain: types, request payloads, pure operations and validation.

mod error;
mod operations;
mod requests;
mod types;
mod validation;

pub use error::ValidationError;
pub use operations::{
    apply_update, locale_key, needs_fan_out, normalize_text, quote_id, topic_quotes_for,
};
pub use requests::{
    CountByAuthorParams, CountByTopicParams, CountParams, LatestByAuthorParams,
    LatestByTopicParams, LatestQuotesParams, NewQuote, QuoteChanges, QuoteUpdate, DEFAULT_LIMIT,
    DEFAULT_TTL_DAYS,
};
pub use types::{
    PartialQuote, Quote, QuoteAuthor, QuoteField, QuoteSource, Topic, TopicQuote, TopicRelation,
    TopicType,
};
pub use validation::{validate_quote, validate_update, MAX_TEXT_LEN};
