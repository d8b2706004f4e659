//! Version resolution and installation layer
//!
//! This module turns a requested coolify-cli version into an extracted
//! installation in the runner tool cache.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│  Installer  │────▶│    Cache    │
//! │ (releases)  │     │ (fallback)  │     │ (tool dirs) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │ Downloader  │
//!                     │ (+extract)  │
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Runner tool cache layout
//! - [`download`]: Downloader trait and HTTP implementation
//! - [`error`]: Error types for every layer
//! - [`extract`]: tar.gz and zip extraction
//! - [`installer`]: Version resolution and the fallback chain
//! - [`platform`]: Host platform to asset naming
//! - [`registry`]: Registry trait for looking up releases
//! - [`registries`]: Concrete registry implementations (GitHub)
//! - [`types`]: Common types like `RequestedVersion` and `Installation`

pub mod cache;
pub mod download;
pub mod error;
pub mod extract;
pub mod installer;
pub mod platform;
pub mod registries;
pub mod registry;
pub mod types;
