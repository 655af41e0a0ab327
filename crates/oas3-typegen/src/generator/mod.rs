pub mod codegen;
pub mod compiler;
pub mod config;
pub mod document;
pub mod errors;
pub mod filter;
pub mod metrics;
pub(crate) mod naming;
pub mod operations;
pub mod orchestrator;
pub mod prune;
pub mod resolver;
pub(crate) mod schema_graph;

#[cfg(test)]
mod tests;
