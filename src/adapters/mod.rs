pub mod postgres_session;

pub use postgres_session::{PgConnector, PgSession};
