pub mod core;
pub mod course;
pub mod news;
pub mod permission;
pub mod user;

pub use user::{User, UserService};
