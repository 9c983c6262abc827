//! Event sources for `framepoll`.
//!
//! A source turns something outside the crate (an OS message, a polled register,
//! a script) into [`RawEvent`](crate::event::RawEvent)s for an
//! [`InputManager`](crate::manager::InputManager). Device registration and window
//! ownership stay with the host application; sources only translate.
//!
//! # Feature flags
//! - **`windows-backend`** (default): Win32 Raw Input forwarding and XInput polling,
//!   compiled on Windows targets only.
//!
//! The payload decoders in [`raw`] and the [`ScriptedSource`] are available on
//! every platform.

use crate::clock::Timestamp;
use crate::error::Result;
use crate::manager::InputManager;

pub mod raw;
pub mod virtual_input;

#[cfg(all(feature = "windows-backend", target_os = "windows"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "windows-backend", target_os = "windows"))))]
pub mod windows;

pub use virtual_input::ScriptedSource;

/// Something that can be pumped once per frame for new events.
pub trait EventSource {
    fn name(&self) -> &str;

    /// Queue everything available as of `now` on `input`. Returns how many events
    /// were delivered.
    fn pump(&mut self, now: Timestamp, input: &mut InputManager) -> Result<usize>;
}
