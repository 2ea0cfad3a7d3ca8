mod common;

mod sqlite_store;
mod startup;
