//! Input configuration: repeat timing and per-class device layouts.
//!
//! [`InputConfig`] is plain serde data so applications can keep it next to their
//! other settings. It round-trips through TOML:
//!
//! ```
//! use framepoll::InputConfig;
//!
//! let cfg = InputConfig::from_toml_str(
//!     r#"
//!     [repeat]
//!     delay_ms = 350
//!     period_ms = 50
//!
//!     [key_matrix]
//!     buttons = 256
//!     axes = []
//!     "#,
//! )
//! .expect("valid config");
//! assert_eq!(cfg.repeat.delay_ms(), 350);
//! assert_eq!(cfg.pointer.buttons, 5); // untouched sections keep their defaults
//! ```
//!
//! Counts, axis kinds and full scales are fixed when a device is built. Dead zones
//! stay adjustable on the built device and are reapplied every frame. Repeat
//! timing is kept by the aggregator and passed into each device's `update`.

use crate::error::{InputError, Result};
use crate::event::DeviceClass;
use crate::layout::{MouseAxis, MouseButton, PadAxis, PadButton, KEY_COUNT};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Default hold time before a held button starts repeating.
pub const DEFAULT_REPEAT_DELAY_MS: u64 = 500;
/// Default interval between repeat pulses once the delay has elapsed.
pub const DEFAULT_REPEAT_PERIOD_MS: u64 = 100;

/// Full scale of a signed 16-bit thumbstick.
pub const STICK_FULL_SCALE: f32 = 32768.0;
/// Full scale of an 8-bit trigger.
pub const TRIGGER_FULL_SCALE: f32 = 255.0;
/// Left stick dead zone (XInput's recommended 7849 counts).
pub const LEFT_STICK_DEAD_ZONE: f32 = 7849.0 / STICK_FULL_SCALE;
/// Right stick dead zone (XInput's recommended 8689 counts).
pub const RIGHT_STICK_DEAD_ZONE: f32 = 8689.0 / STICK_FULL_SCALE;
/// Trigger dead zone (XInput's recommended threshold of 30).
pub const TRIGGER_DEAD_ZONE: f32 = 30.0 / TRIGGER_FULL_SCALE;

const DEFAULT_PERIOD: NonZeroU64 = match NonZeroU64::new(DEFAULT_REPEAT_PERIOD_MS) {
    Some(period) => period,
    None => panic!("default repeat period must be non-zero"),
};

/// Key-repeat timing shared by every device.
///
/// The period is non-zero by construction; a zero period fails to deserialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatConfig {
    delay_ms: u64,
    period_ms: NonZeroU64,
}

impl RepeatConfig {
    pub fn new(delay_ms: u64, period_ms: u64) -> Result<Self> {
        let period_ms = NonZeroU64::new(period_ms).ok_or(InputError::ZeroRepeatPeriod)?;
        Ok(Self {
            delay_ms,
            period_ms,
        })
    }

    #[inline]
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    #[inline]
    pub fn period_ms(&self) -> u64 {
        self.period_ms.get()
    }

    pub fn set_delay_ms(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms;
    }

    pub fn set_period_ms(&mut self, period_ms: u64) -> Result<()> {
        self.period_ms = NonZeroU64::new(period_ms).ok_or(InputError::ZeroRepeatPeriod)?;
        Ok(())
    }
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_REPEAT_DELAY_MS,
            period_ms: DEFAULT_PERIOD,
        }
    }
}

/// How an axis turns raw input into a value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisSpec {
    /// Accumulates deltas for one frame, then returns to zero.
    Relative,
    /// Holds the latest sample, normalized by `full_scale` and `dead_zone`.
    Absolute {
        full_scale: f32,
        #[serde(default)]
        dead_zone: f32,
    },
}

impl AxisSpec {
    pub fn absolute(full_scale: f32, dead_zone: f32) -> Self {
        AxisSpec::Absolute {
            full_scale,
            dead_zone,
        }
    }

    #[inline]
    pub fn is_absolute(&self) -> bool {
        matches!(self, AxisSpec::Absolute { .. })
    }
}

/// Button count and axis kinds for one device class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceLayout {
    pub buttons: usize,
    #[serde(default)]
    pub axes: Vec<AxisSpec>,
}

impl DeviceLayout {
    /// Five mouse buttons; X, Y and wheel deltas.
    pub fn pointer() -> Self {
        Self {
            buttons: MouseButton::COUNT,
            axes: vec![AxisSpec::Relative; MouseAxis::COUNT],
        }
    }

    /// One key per virtual-key code, no axes.
    pub fn key_matrix() -> Self {
        Self {
            buttons: KEY_COUNT,
            axes: Vec::new(),
        }
    }

    /// Standard gamepad: fourteen buttons, two sticks and two triggers.
    pub fn analog() -> Self {
        let axes = PadAxis::ALL
            .iter()
            .map(|axis| match axis {
                PadAxis::LeftX | PadAxis::LeftY => {
                    AxisSpec::absolute(STICK_FULL_SCALE, LEFT_STICK_DEAD_ZONE)
                }
                PadAxis::RightX | PadAxis::RightY => {
                    AxisSpec::absolute(STICK_FULL_SCALE, RIGHT_STICK_DEAD_ZONE)
                }
                PadAxis::LeftTrigger | PadAxis::RightTrigger => {
                    AxisSpec::absolute(TRIGGER_FULL_SCALE, TRIGGER_DEAD_ZONE)
                }
            })
            .collect();
        Self {
            buttons: PadButton::COUNT,
            axes,
        }
    }

    /// Largest button and axis counts a class can hold.
    pub fn limits(class: DeviceClass) -> (usize, usize) {
        match class {
            DeviceClass::Pointer => (16, 8),
            DeviceClass::KeyMatrix => (KEY_COUNT, 0),
            // Register snapshots carry buttons as a 32-bit mask.
            DeviceClass::Analog => (32, 16),
        }
    }

    /// Reject layouts a device of `class` could not honor.
    pub fn validate(&self, class: DeviceClass) -> Result<()> {
        let (max_buttons, max_axes) = Self::limits(class);
        if self.buttons > max_buttons {
            return Err(InputError::InvalidButtonCount {
                class,
                requested: self.buttons,
                max: max_buttons,
            });
        }
        if self.axes.len() > max_axes {
            return Err(InputError::InvalidAxisCount {
                class,
                requested: self.axes.len(),
                max: max_axes,
            });
        }

        for (axis, spec) in self.axes.iter().enumerate() {
            if let AxisSpec::Absolute {
                full_scale,
                dead_zone,
            } = *spec
            {
                if class != DeviceClass::Analog {
                    return Err(InputError::AbsoluteAxisNotAllowed { class, axis });
                }
                if !(full_scale.is_finite() && full_scale > 0.0) {
                    return Err(InputError::InvalidFullScale {
                        class,
                        axis,
                        value: full_scale,
                    });
                }
                validate_dead_zone(class, axis, dead_zone)?;
            }
        }
        Ok(())
    }
}

/// Dead zones are fractions of full range.
pub(crate) fn validate_dead_zone(class: DeviceClass, axis: usize, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InputError::InvalidDeadZone { class, axis, value })
    }
}

/// Complete configuration for an [`InputManager`](crate::manager::InputManager).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub repeat: RepeatConfig,
    pub pointer: DeviceLayout,
    pub key_matrix: DeviceLayout,
    pub analog: DeviceLayout,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            repeat: RepeatConfig::default(),
            pointer: DeviceLayout::pointer(),
            key_matrix: DeviceLayout::key_matrix(),
            analog: DeviceLayout::analog(),
        }
    }
}

impl InputConfig {
    /// Parse and validate a TOML document. Missing sections take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: InputConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn layout(&self, class: DeviceClass) -> &DeviceLayout {
        match class {
            DeviceClass::Pointer => &self.pointer,
            DeviceClass::KeyMatrix => &self.key_matrix,
            DeviceClass::Analog => &self.analog,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for class in DeviceClass::ALL {
            self.layout(class).validate(class)?;
        }
        Ok(())
    }
}
