pub mod pagination;
pub mod problem;
pub mod request_id;
