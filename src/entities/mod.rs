pub mod subscribes;
