//! Stable channel indices for the built-in device layouts.
//!
//! Indices here match the default [`DeviceLayout`](crate::config::DeviceLayout)s
//! and the Windows adapters. Keys on the key matrix are addressed directly by their
//! 8-bit virtual-key code, so every `u8` is a valid key index.

/// Number of keys on the default key matrix (one per virtual-key code).
pub const KEY_COUNT: usize = 256;

/// Key-matrix index of an 8-bit virtual-key code.
#[inline]
pub fn key(vkey: u8) -> usize {
    vkey as usize
}

macro_rules! channel_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const COUNT: usize = Self::ALL.len();

            /// Device-local index of this channel.
            #[inline]
            pub fn index(self) -> usize {
                self as usize
            }

            /// Human-friendly label for UIs and logs.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(channel: $name) -> usize {
                channel.index()
            }
        }
    };
}

channel_enum! {
    /// Pointer buttons, in Raw Input flag order.
    MouseButton {
        Left => "Left",
        Right => "Right",
        Middle => "Middle",
        X1 => "X1",
        X2 => "X2",
    }
}

channel_enum! {
    /// Pointer relative axes.
    MouseAxis {
        DeltaX => "dX",
        DeltaY => "dY",
        Wheel => "Wheel",
    }
}

channel_enum! {
    /// Gamepad buttons. D-pad first, in XInput bit order.
    PadButton {
        DPadUp => "Up",
        DPadDown => "Down",
        DPadLeft => "Left",
        DPadRight => "Right",
        Start => "Start",
        Back => "Back",
        LeftThumb => "LThumb",
        RightThumb => "RThumb",
        LeftShoulder => "LB",
        RightShoulder => "RB",
        A => "A",
        B => "B",
        X => "X",
        Y => "Y",
    }
}

channel_enum! {
    /// Gamepad absolute axes.
    PadAxis {
        LeftX => "LX",
        LeftY => "LY",
        RightX => "RX",
        RightY => "RY",
        LeftTrigger => "LT",
        RightTrigger => "RT",
    }
}
