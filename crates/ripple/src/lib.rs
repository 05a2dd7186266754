//! Ripple - business rule impact propagation.
//!
//! Given the files changed by a pull request, ripple finds the business
//! rules those files implement and follows the dependencies between rules
//! to report every rule the change may affect, up to three hops away.
//!
//! The crate provides both a CLI application and a library. Library users
//! typically build a [`catalog::RuleCatalog`] (or implement the
//! [`catalog`] accessor traits over their own store) and run an
//! [`engine::ImpactEngine`] over it.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod catalog;
pub mod domain;
pub mod engine;
pub mod error;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod app;
pub mod commands;
pub mod config;
pub mod output;
