pub mod audit;
pub mod build;
pub mod extract;
pub mod schema;
