#![cfg(target_os = "windows")]

//! Windows input adapters.
//!
//! - **Raw Input**: forwards `WM_INPUT` packets from a host-owned message loop to
//!   the pointer and key-matrix devices.
//! - **XInput**: polls controller slots and forwards their registers to the analog
//!   device.
//!
//! Both only translate. Registering Raw Input devices and owning the window is up
//! to the host application.

pub mod raw_input;
pub mod xinput;

pub use raw_input::forward_wm_input;
pub use xinput::{probe_pads, XInputPad};
