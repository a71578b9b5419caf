pub mod app_settings;
pub mod app_state;
pub mod export;
pub mod messages;
