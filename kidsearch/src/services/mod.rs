mod search;

pub use search::{SearchService, MAX_QUERY_CHARS, SUGGESTED_QUERIES};
