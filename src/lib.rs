#![forbid(unsafe_code)]

//! Normalization and feed assembly for an unofficial video-platform client.
//!
//! Upstream items arrive in several mutually inconsistent shapes; everything
//! handed to presentation code is a [`video::CanonicalVideo`].

pub mod config;
pub mod duration;
pub mod feed;
pub mod images;
pub mod published;
pub mod raw;
pub mod shorts;
pub mod text;
pub mod upstream;
pub mod video;
pub mod views;
