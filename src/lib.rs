//! Composable App
//!
//! A composition engine that assembles an application from pluggable
//! systems: it maps their sources, connects their parts and replays their
//! registrar hooks in declaration order.

pub use composer::{Composer, Registry};
pub use config::EngineConfig;
pub use engine::{Command, Engine};
pub use error::EngineError;
pub use locator::SystemCatalog;
pub use part::PartDefinition;
pub use registrar::Registrar;
pub use system::System;
pub use types::{Fragment, Module, fragment};

pub mod autoload;
pub mod composer;
pub mod config;
pub mod dev;
pub mod engine;
pub mod error;
pub mod loaders;
pub mod locator;
pub mod logging;
pub mod naming;
pub mod part;
pub mod registrar;
pub mod system;
pub mod types;
