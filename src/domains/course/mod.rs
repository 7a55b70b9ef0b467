pub mod types;
pub mod repository;
pub mod service;

pub use types::{Course, CourseResponse, NewCourse};
pub use repository::{CourseRepository, SqliteCourseRepository};
pub use service::{CourseService, CourseServiceImpl};
