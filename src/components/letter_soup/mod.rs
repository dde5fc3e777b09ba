//! Animated letter soup background.
//!
//! Renders a field of drifting letter images that:
//! - Settle onto a jittered grid covering the viewport
//! - Scatter away from the cursor or an active touch
//! - Part around a breathing circular clear zone on click, key or shake
//! - Reveal a randomly chosen quote inside the cleared circle
//!
//! # Example
//!
//! ```ignore
//! use letter_soup::{LetterSoup, SoupSettings};
//!
//! let settings = SoupSettings {
//!     quotes: vec!["Stay hungry, stay foolish".into()],
//!     ..Default::default()
//! };
//!
//! view! { <LetterSoup settings=settings /> }
//! ```

pub mod clear_zone;
mod component;
pub mod config;
pub mod context;
pub mod input;
pub mod message;
pub mod particles;
pub mod quotes;
mod render;
pub mod schedule;
pub mod targets;

pub use component::LetterSoup;
pub use config::{ClearPolicy, SoupSettings};
pub use context::AnimationContext;
