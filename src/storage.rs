mod memory;
mod pg_store;
mod postgres;
mod store;

pub use self::{
    memory::MemoryStore,
    pg_store::PgStore,
    postgres::{Db, SCHEMA, migrate, new_db_pool},
    store::Store,
};
