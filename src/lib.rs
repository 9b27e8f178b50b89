// src/lib.rs

//! Campaign publisher library
//!
//! Dumps the results of one test campaign from the results DB, downloads
//! its artifacts from an S3-compatible object store, packs everything into
//! a single zip archive and publishes it back with a public download link.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod utils;
