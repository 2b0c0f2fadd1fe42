pub mod subscribe;

pub use subscribe::subscribe_config;
