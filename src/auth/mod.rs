pub mod credential;
pub mod token;

pub use credential::{Credential, ServiceAccountKey, DEFAULT_TOKEN_URI};
pub use token::{AccessToken, TokenProvider, SPREADSHEETS_READONLY_SCOPE};
