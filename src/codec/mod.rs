//! URL query-string codecs.

pub mod parsers;
pub mod query_string;

pub use parsers::{
    encode_sort, read_url_state, FilterCodec, FreeTextPolicy, ParamCodec, PositiveIntCodec,
    SortCodec, UrlViewState,
};
pub use query_string::QueryString;
