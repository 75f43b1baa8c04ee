pub mod config;
pub mod password;

#[cfg(feature = "logging")]
pub mod logging;
