pub mod types;
pub mod repository;
pub mod service;

pub use types::{NewNews, News, NewsFilter, NewsResponse, UpdateNews, NEWS_PAGE_SIZE};
pub use repository::{NewsRepository, SqliteNewsRepository};
pub use service::{NewsService, NewsServiceImpl};
