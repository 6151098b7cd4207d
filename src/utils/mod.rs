//! Utility modules for the CMS backend

pub mod error;
pub mod validation;
