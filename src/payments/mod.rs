pub mod client;
pub mod signature;

pub use client::{CheckoutSession, CreateSessionRequest, PaymentClient, SessionLineItem};
