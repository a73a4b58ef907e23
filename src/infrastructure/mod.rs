pub mod auth_client;
pub mod database;
pub mod entities;
pub mod inference_client;
pub mod repositories;
pub mod traits;
