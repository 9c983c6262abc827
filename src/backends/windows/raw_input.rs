//! Windows Raw Input forwarding (keyboard + mouse).
//!
//! The host application owns the window, registers its Raw Input devices and runs
//! the message loop. For each `WM_INPUT` it hands `wparam` and `lparam` to
//! [`forward_wm_input`]. Background (`RIM_INPUTSINK`) input is skipped; anything
//! else is copied out of the OS buffer, decoded with
//! [`backends::raw`](crate::backends::raw) and queued on the pointer or
//! key-matrix device.
//!
//! ## What you don't get
//! - No device registration and no window procedure.
//! - No text/character translation (this is *not* a WM_CHAR layer).

#![cfg(target_os = "windows")]

use crate::backends::raw::{
    decode_keyboard, decode_mouse, is_foreground_input, RawKeyboard, RawMouse,
};
use crate::event::DeviceClass;
use crate::manager::InputManager;
use core::ffi::c_void;
use tracing::trace;
use windows_sys::Win32::UI::Input::*;

/// One decoded Raw Input packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawInputPacket {
    Keyboard(RawKeyboard),
    Mouse(RawMouse),
}

/// Copy a `WM_INPUT` payload out of the OS and parse it.
pub fn read_wm_input(lparam: isize) -> Option<RawInputPacket> {
    let header_size = core::mem::size_of::<RAWINPUTHEADER>() as u32;
    unsafe {
        let mut size: u32 = 0;
        let r0 = GetRawInputData(
            lparam as _,
            RID_INPUT,
            core::ptr::null_mut(),
            &mut size,
            header_size,
        );
        if r0 == u32::MAX || size == 0 {
            return None;
        }

        let mut buf = vec![0u8; size as usize];
        let r1 = GetRawInputData(
            lparam as _,
            RID_INPUT,
            buf.as_mut_ptr() as *mut c_void,
            &mut size,
            header_size,
        );
        if r1 == u32::MAX {
            return None;
        }

        read_raw_input_bytes(&buf)
    }
}

/// Parse a `RID_INPUT` payload already copied out of the OS.
pub fn read_raw_input_bytes(buf: &[u8]) -> Option<RawInputPacket> {
    let header_size = core::mem::size_of::<RAWINPUTHEADER>();
    if buf.len() < header_size {
        return None;
    }

    unsafe {
        // Payload size depends on the device type; read the header first.
        let header: RAWINPUTHEADER =
            core::ptr::read_unaligned(buf.as_ptr() as *const RAWINPUTHEADER);
        let data = buf.as_ptr().add(header_size);

        match header.dwType {
            RIM_TYPEKEYBOARD => {
                if buf.len() < header_size + core::mem::size_of::<RAWKEYBOARD>() {
                    return None;
                }
                let kbd: RAWKEYBOARD = core::ptr::read_unaligned(data as *const RAWKEYBOARD);
                Some(RawInputPacket::Keyboard(RawKeyboard {
                    vkey: kbd.VKey as u16,
                    flags: kbd.Flags as u16,
                }))
            }

            RIM_TYPEMOUSE => {
                if buf.len() < header_size + core::mem::size_of::<RAWMOUSE>() {
                    return None;
                }
                let m: RAWMOUSE = core::ptr::read_unaligned(data as *const RAWMOUSE);
                Some(RawInputPacket::Mouse(RawMouse {
                    flags: m.usFlags as u16,
                    button_flags: m.Anonymous.Anonymous.usButtonFlags,
                    button_data: m.Anonymous.Anonymous.usButtonData,
                    last_x: m.lLastX,
                    last_y: m.lLastY,
                }))
            }

            _ => None,
        }
    }
}

/// Queue the events of one Raw Input packet. Returns how many were accepted.
pub fn forward_packet(packet: &RawInputPacket, input: &mut InputManager) -> usize {
    match packet {
        RawInputPacket::Keyboard(kbd) => decode_keyboard(kbd)
            .map(|event| input.enqueue(DeviceClass::KeyMatrix, event).is_ok())
            .map_or(0, usize::from),
        RawInputPacket::Mouse(mouse) => decode_mouse(mouse)
            .into_iter()
            .filter(|event| input.enqueue(DeviceClass::Pointer, event.clone()).is_ok())
            .count(),
    }
}

/// Handle a `WM_INPUT` message: read, decode and queue its events.
///
/// Input received while the window is in the background is not queued.
pub fn forward_wm_input(wparam: usize, lparam: isize, input: &mut InputManager) -> usize {
    if !is_foreground_input(wparam) {
        trace!("WM_INPUT from background, skipping");
        return 0;
    }
    match read_wm_input(lparam) {
        Some(packet) => {
            trace!("WM_INPUT {:?}", packet);
            forward_packet(&packet, input)
        }
        None => 0,
    }
}
