//! Extras resources (Tags, Webhooks)

pub mod tag;
pub mod webhook;
