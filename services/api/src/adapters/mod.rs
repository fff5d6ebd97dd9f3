pub mod auth;
pub mod db;

pub use auth::BearerTokenAdapter;
pub use db::PgStoreAdapter;
