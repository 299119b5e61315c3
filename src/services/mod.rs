pub mod api;
pub mod loader;
pub mod submit;
