//! UI components.

pub mod letter_soup;
