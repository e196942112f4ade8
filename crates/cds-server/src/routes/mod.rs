//! # Route Modules
//!
//! `packages` carries the package lifecycle verbs; `metadata` is the
//! placeholder behind `GET /{id}?metadata`.

pub mod metadata;
pub mod packages;
