//! Supplymap - supply-chain dependency traversal and disruption impact analysis.
//!
//! A supply network is loaded from three canonical tables (nodes, a weighted
//! adjacency matrix and optional metadata), turned into a directed
//! multigraph, and queried around a focus node:
//!
//! 1. [`edges`]: adjacency matrix to sparse weighted edge list
//! 2. [`graph`]: node table + edge list to a [`graph::SupplyGraph`]
//! 3. [`traversal`]: bounded upstream/downstream reachability and the induced subgraph
//! 4. [`roles`]: focus/upstream/downstream labelling
//! 5. [`impact`]: counts, regions and weight flowing through the downstream zone
//!
//! Everything else (table loading, diagnostics, view filtering, export, the
//! CLI) is glue around that pipeline.

#![forbid(unsafe_code)]

pub mod analysis;
pub mod cache;
pub mod diagnostics;
pub mod domain;
pub mod edges;
pub mod error;
pub mod export;
pub mod graph;
pub mod impact;
pub mod roles;
pub mod tables;
pub mod traversal;
pub mod view;

// Public CLI module (needed by binary)
pub mod cli;

pub mod config;
pub mod output;

pub use error::{Error, Result};
