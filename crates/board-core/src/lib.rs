//! Core types, policies and services for the hospital bulletin board.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! services are generic over [`store::BoardStore`]; storage backends and the
//! HTTP layer live in their own crates.

pub mod bulletin;
pub mod calendar;
pub mod directory;
pub mod error;
pub mod notification;
pub mod password;
pub mod post;
pub mod role;
pub mod schedule;
pub mod store;

pub use error::{Error, Result};
