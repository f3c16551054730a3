pub mod backend_log;
pub mod capture_endpoint;
pub mod capture_sink;
pub mod config_registrar;
pub mod module_image;
