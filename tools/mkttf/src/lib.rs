//! Conversion of a set of BDF bitmap fonts into a TrueType font and a FontForge font source.
//!
//! The BDF files, sorted by ascending pixel size, are merged into a single font whose glyphs
//! are traced into outlines by a [`FontEngine`][fe]. See [`convert::convert`].
//!
//! [fe]: engine::FontEngine

pub mod cli;
pub mod compat;
pub mod convert;
pub mod error;
pub mod os2;
