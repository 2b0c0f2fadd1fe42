pub mod subscribe_service;

pub use subscribe_service::*;
