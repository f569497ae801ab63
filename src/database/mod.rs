//! Connection pool, migrations and write-transaction setup.

mod pool;

pub use pool::{create_pool, run_migrations, Database, DatabaseError};
