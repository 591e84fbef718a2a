//! Port traits for the collaborators the domain depends on.

pub mod config_port;
pub mod news_port;
pub mod price_port;
pub mod sentiment_port;
