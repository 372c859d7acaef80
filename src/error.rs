use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("invalid parcel: {0}")]
    InvalidParcel(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
