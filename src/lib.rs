//! Single-view feed reader core.
//!
//! A [`FeedRegistry`](feed::FeedRegistry) of subscriptions, a
//! [`FeedLoader`](loader::FeedLoader) that fetches one of them at a time into a
//! shared [`RenderTarget`](state::RenderTarget), and a
//! [`MenuController`](state::MenuController) that every load closes. A failed
//! load never disturbs what is on display. [`App`](app::App) wires these into
//! one session.

pub mod app;
pub mod config;
pub mod feed;
pub mod loader;
pub mod present;
pub mod state;
pub mod util;
