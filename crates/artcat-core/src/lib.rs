pub mod analysis;
pub mod config;
pub mod encode;
pub mod errors;
pub mod models;
pub mod session;
pub mod util;
pub mod worker;
