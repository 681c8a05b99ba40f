//! Five Bomber Core — shared domain abstractions.
//!
//! This crate defines the traits and data types every other crate depends
//! on: the clock seam, the error taxonomy, the domain models, the storage
//! ports, and the transport send primitive. It contains no infrastructure
//! code.

pub mod clock;
pub mod error;
pub mod model;
pub mod repository;
pub mod transport;
