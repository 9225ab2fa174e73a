pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod pg_repo;

pub use pg_repo::PgSubscriptionsRepository;
