pub mod connection;
pub mod profile;

pub use connection::Connection;
pub use profile::{MockProfileRepository, ProfileRepository, ProfileRepositoryImpl};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt profile row for user {user_id}: {reason}")]
    CorruptRow { user_id: i64, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
