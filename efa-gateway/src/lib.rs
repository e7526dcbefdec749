//! EFA departure gateway.
//!
//! A small HTTP service in front of an EFA journey-planner backend. It
//! resolves free-text stop names to stop ids and turns the provider's
//! loosely typed departure monitor into a stable JSON board, cached for a
//! short while and optionally filtered by platform.

pub mod cache;
pub mod config;
pub mod domain;
pub mod efa;
pub mod loose;
pub mod normalize;
pub mod resolve;
pub mod track;
pub mod web;
