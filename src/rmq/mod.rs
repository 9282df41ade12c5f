pub mod client;

pub use client::{publish_event, spawn_consumer};
