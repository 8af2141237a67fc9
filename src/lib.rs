// Library for tests to access modules

pub mod config;
pub mod models;
pub mod pipeline;
pub mod prometheus_repo;
pub mod report_writer;
pub mod routes;
pub mod scheduler;
pub mod version;
