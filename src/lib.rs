//! code-cartographer library: structural metamodel construction and bounded view queries.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod server;
