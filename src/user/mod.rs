pub mod auth;
mod sqlite_user_store;
mod user_manager;
mod user_models;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue, UsernamePasswordCredentials};
pub use sqlite_user_store::SqliteUserStore;
pub use user_manager::{RegistrationError, UserManager, MIN_PASSWORD_LENGTH};
pub use user_models::User;
pub use user_store::{UserAuthCredentialsStore, UserAuthTokenStore, UserStore};
