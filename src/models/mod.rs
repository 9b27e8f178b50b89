// src/models/mod.rs

//! Data structures shared across pipeline stages.

pub mod result;

pub use result::{CampaignResult, TestDetails, TestResult};
