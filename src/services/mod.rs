pub mod audit;
pub mod cache;
pub mod event_manager;
pub mod gateway;
pub mod help;
pub mod localization;
pub mod log_channels;
pub mod logger;
pub mod notification;
pub mod notifier;
pub mod setup;
