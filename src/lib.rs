//! PDF Crop Server Library
//!
//! Exposes the server's modules for the binary and for integration
//! tests.
//!
//! # Modules
//!
//! - `pdf`: coordinate conversion and page embedding via lopdf
//! - `routes`: HTTP surface (POST /crop, GET /health, static front-end)
//! - `upload`: scoped temp-file resource for the uploaded document

pub mod config;
pub mod error;
pub mod pdf;
pub mod routes;
pub mod state;
pub mod upload;
