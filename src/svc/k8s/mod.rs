//! # Kubernetes module
//!
//! This module provide helpers on kubernetes resources
pub mod resource;
