//! Taskdesk: task and project tracking for two organizations, with
//! AI-assisted action-item extraction and issue filing.
//!
//! Storage, models and views live in [`taskdesk_core`]; this crate adds the
//! network adapters, configuration and the HTTP/CLI surfaces.

pub mod ai;
pub mod api;
pub mod attachments;
pub mod backend;
pub mod chat;
pub mod commands;
pub mod config;

#[cfg(test)]
mod loopback;
