pub mod db;
pub mod tables;

pub use db::{Batch, Database, Sample};
pub use tables::{table, TableDef, TABLES};
