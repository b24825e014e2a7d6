pub mod engine;
pub mod health;
pub mod monitor;
pub mod pipeline;
pub mod scheduler;
pub mod throttle;
pub mod world;
