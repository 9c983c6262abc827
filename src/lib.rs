//! framepoll: frame-polled input devices.
//!
//! Raw hardware events are buffered as they arrive and folded into a stable
//! per-frame snapshot when the application calls [`InputManager::update`]: which
//! buttons are held, which were triggered or released this frame, which fired a
//! key-repeat pulse, and where the relative and absolute axes stand.
//!
//! ```
//! use framepoll::{key, DeviceClass, InputManager, RawEvent};
//!
//! let mut input = InputManager::with_defaults();
//! input.enqueue(DeviceClass::KeyMatrix, RawEvent::press(key(b'A'))).unwrap();
//!
//! input.update(0);
//! assert!(input.snapshot(DeviceClass::KeyMatrix).button(key(b'A')).triggered());
//!
//! input.update(16);
//! let a = input.snapshot(DeviceClass::KeyMatrix).button(key(b'A'));
//! assert!(a.held() && !a.triggered());
//! ```

pub mod backends;
pub mod button;
pub mod clock;
pub mod config;
pub mod deadzone;
pub mod device;
pub mod error;
pub mod event;
pub mod layout;
pub mod manager;
pub mod snapshot;

pub use button::Button;
pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use config::{AxisSpec, DeviceLayout, InputConfig, RepeatConfig};
pub use deadzone::normalize;
pub use device::Device;
pub use error::{InputError, Result};
pub use event::{DeviceClass, PadRegister, RawEvent, Transition};
pub use layout::{key, MouseAxis, MouseButton, PadAxis, PadButton, KEY_COUNT};
pub use manager::{EventSender, InputManager};
pub use snapshot::{Axis, DeviceState, Snapshot};
