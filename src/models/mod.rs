pub mod url;

pub use url::{
    parse_timestamp, AliasValidation, ErrorBody, ShortenRequest, ShortenResponse,
    ValidateAliasRequest,
};
