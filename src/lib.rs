#![doc(test(attr(deny(warnings))))]

//! Invest Budget tracks monthly investment spending against per-category caps.
//! This crate hosts tracing setup, the unified CLI error and the line-oriented
//! shell; the business rules live in `ivb-core`.

pub mod cli;
pub mod errors;
pub mod utils;
