//! # Services module
//!
//! This module provide custom resources, kubernetes helpers and the
//! configuration.
pub mod cfg;
pub mod crd;
pub mod k8s;
