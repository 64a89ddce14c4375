//! Pipeline stages for image normalization.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the pixel backend can be swapped behind [`codec::ImageCodec`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ normalize ──▶ resize ──▶ encode
//! (path/URL) (codec)   (RGB/RGBA)    (≤ max)    (JPEG|PNG)
//! ```
//!
//! 1. [`input`]    : expand paths and directories, read files, download URLs
//! 2. [`codec`]    : decode bytes and report the declared colour mode
//! 3. [`normalize`]: collapse every mode to RGB or RGBA, using
//!    [`transparency`] to decide when alpha is worth keeping
//! 4. [`resize`]   : fit the longer side within the configured maximum
//! 5. [`encode`]   : re-check alpha, pick PNG or JPEG, serialise

pub mod codec;
pub mod encode;
pub mod input;
pub mod normalize;
pub mod resize;
pub mod transparency;
