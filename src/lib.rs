pub mod app;
pub mod config;
pub mod cover;
pub mod db;
pub mod demo_seeder;
pub mod error;
pub mod method_override;
pub mod rendering;
pub mod routes;
pub mod utils;
