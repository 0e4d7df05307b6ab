//! Shared wire types for the federation portal payment service.
//!
//! This crate holds everything that crosses a process boundary: the JSON
//! bodies of the portal's REST API, the LiqPay message formats, and the
//! LiqPay `data` + `signature` scheme.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

pub mod objects;
pub mod signature;
