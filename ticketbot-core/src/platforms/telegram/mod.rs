// File: src/platforms/telegram/mod.rs

pub mod client;
pub mod requests;
pub mod runtime;

pub use client::TelegramClient;
pub use runtime::TelegramPlatform;
