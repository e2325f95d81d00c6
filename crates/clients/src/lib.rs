//! Clients domain module.
//!
//! A client is the customer a contractor works for: contact details, postal
//! address and the projects run on their behalf. This crate holds the view
//! model and the create/update payloads; persistence lives in `menuiserie-infra`.

pub mod client;

pub use client::{Client, ClientPatch, NewClient};
