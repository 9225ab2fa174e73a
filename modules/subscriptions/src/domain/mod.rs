pub mod error;
pub mod month_year;
pub mod repo;
pub mod service;
pub mod validator;
