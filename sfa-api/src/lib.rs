pub mod account;
pub mod i18n;

#[cfg(feature = "client")]
pub mod client;
