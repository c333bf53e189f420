//! Offscreen GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue, hardware or software
//! - owning offscreen render targets
//! - reading rendered pixels back to the CPU

mod gpu;
mod init;
mod target;

pub use gpu::{GpuContext, GpuFrame};
pub use init::{AdapterChoice, OffscreenInit};
pub use target::{OffscreenTarget, padded_row_bytes, unpad_rows};
