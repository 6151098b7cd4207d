//! Core domain types for the CMS backend

pub mod models;
