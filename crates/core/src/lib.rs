//! Domain logic for the quotes widget.
//!
//! Everything here is free of database and HTTP dependencies: settings
//! validation, quote selection over an abstract [`selection::QuoteSource`],
//! fragment rendering, refresh tokens, and the client refresh state machine.

rust_i18n::i18n!("locales", fallback = "en");

pub mod controller;
pub mod error;
pub mod i18n;
pub mod quote;
pub mod refresh;
pub mod render;
pub mod selection;
pub mod settings;
pub mod tokens;
pub mod types;
