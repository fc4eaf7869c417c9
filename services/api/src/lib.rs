pub mod adapters;
pub mod config;
pub mod error;
pub mod terminal;
pub mod web;
