pub mod repository;

pub use repository::{FindById, ScopedRepository, SoftDeletable, Scope};
