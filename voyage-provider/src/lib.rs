pub mod amadeus;
pub mod booking;
pub mod decode;
pub mod routing;
pub mod stripe;
pub mod tables;
pub mod token;

pub use routing::ProviderRouter;
pub use tables::ProviderTables;
pub use token::{AuthError, TokenCache};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Auth(#[from] token::AuthError),
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
}
