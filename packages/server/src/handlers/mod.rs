pub mod gateway;
pub mod migration;
pub mod model;
