use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("cannot resolve `{alias}.{token}`: alias `{alias}` matches {matches} tables")]
    UnresolvedAlias {
        alias: String,
        token: String,
        matches: usize,
    },

    #[error("malformed join `{0}`, expected `table alias ON condition`")]
    MalformedJoin(String),

    #[error("query has no FROM table")]
    MissingFrom,
}
