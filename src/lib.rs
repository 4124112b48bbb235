pub mod api;
pub mod cache;
pub mod extender;
pub mod framework;
