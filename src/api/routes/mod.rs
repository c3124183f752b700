pub mod admin;
pub mod conversion;
pub mod favorites;
pub mod messages;
pub mod middleware;
pub mod saved_searches;
pub mod users;
pub mod vehicles;
