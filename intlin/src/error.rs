use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The matrix has no integer scaled inverse.
    #[error("matrix is singular")]
    Singular,

    /// A matrix literal could not be parsed.
    #[error("invalid matrix literal: {0}")]
    Parse(String),
}
