pub mod endpoint_registry;
