//! Grid spatial layout engine for the fndash dashboard canvas.
//!
//! Widgets live on a fixed rectangular cell grid. This crate owns the full
//! lifecycle of that layout: mapping cell identifiers such as `"3F"` to pixel
//! boxes, hit-testing pointer input, driving drag and resize gestures with a
//! live preview, finding free space for new widgets, and keeping synchronized
//! map viewports in lockstep. The host (a browser shell or the `fndash` CLI) is
//! responsible only for feeding structured input events to the engine and
//! applying the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`], the dashboard context that routes input |
//! | [`cell`] | Cell identifiers and grid-space rectangles |
//! | [`geometry`] | Grid configuration, bounds, and pixel projection |
//! | [`placement`] | Overlap test and first-fit free space search |
//! | [`input`] | Drag/resize gesture state machine |
//! | [`hit`] | Pointer hit-testing against widget boxes and handles |
//! | [`registry`] | Authoritative widget records and their lifecycle |
//! | [`sync`] | Leader/follower viewport synchronization |
//! | [`dashboard`] | Persisted dashboard document and the store interface |
//! | [`error`] | Error taxonomy |
//! | [`consts`] | Shared numeric constants (bounds, handle sizes, caps) |

pub mod cell;
pub mod consts;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod placement;
pub mod registry;
pub mod sync;
