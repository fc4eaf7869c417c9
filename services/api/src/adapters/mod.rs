pub mod db;
pub mod http;

pub use db::DbAdapter;
pub use http::HttpProblemRepository;
