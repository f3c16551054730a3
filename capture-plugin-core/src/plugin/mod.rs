pub mod binder;
pub mod discovery;
pub mod proxy;
