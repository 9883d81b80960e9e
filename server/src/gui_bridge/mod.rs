pub mod bridge;
pub mod catalog;
pub mod model;
