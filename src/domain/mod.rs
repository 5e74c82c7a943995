pub mod builder;
pub mod diagnostics;
pub mod edge;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod namespace;
pub mod node;
pub mod ports;
pub mod query;
pub mod resolver;
pub mod semantic;
pub mod view;
