pub mod database;
pub mod error;
pub mod executor;

pub mod sql {
    pub mod mysql {
        pub mod connector;
        pub mod params;
        pub mod row;
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod recording;

pub use database::Database;
pub use error::DbError;
pub use executor::{Connector, Executor};
