use framepoll::backends::{EventSource, ScriptedSource};
use framepoll::{
    key, Clock, DeviceClass, InputManager, ManualClock, MouseAxis, MouseButton, PadAxis, PadButton,
    PadRegister, RawEvent,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const FRAME_MS: u64 = 16;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut input = InputManager::with_defaults();
    let clock = ManualClock::new(0);

    // A short session: hold W through two repeat pulses, click, scroll, nudge a stick.
    let mut script = ScriptedSource::new("replay")
        .tap(DeviceClass::KeyMatrix, key(b'W'), 32, 820)
        .tap(DeviceClass::Pointer, MouseButton::Left.index(), 100, 180)
        .at(100, DeviceClass::Pointer, RawEvent::delta(MouseAxis::DeltaX.index(), 12))
        .at(116, DeviceClass::Pointer, RawEvent::delta(MouseAxis::DeltaX.index(), -3))
        .at(240, DeviceClass::Pointer, RawEvent::delta(MouseAxis::Wheel.index(), -120))
        .at(
            300,
            DeviceClass::Analog,
            RawEvent::Register(PadRegister::new(
                1 << PadButton::A.index(),
                vec![24_000, 0, 0, 0, 0, 255],
            )),
        )
        .at(
            400,
            DeviceClass::Analog,
            RawEvent::Register(PadRegister::new(0, vec![2_000, 0, 0, 0, 0, 0])),
        );

    info!("Replaying {} scripted events", script.remaining());

    while !script.is_finished() || clock.now_ms() <= 900 {
        if let Err(e) = script.pump(clock.now_ms(), &mut input) {
            error!("{}: {e}", script.name());
            return;
        }
        input.update_from(&clock);
        report(&input);
        clock.advance(FRAME_MS);
    }
}

fn report(input: &InputManager) {
    let now = input.frame_time();
    for class in DeviceClass::ALL {
        let state = input.snapshot(class);
        for (index, button) in state.buttons().iter().enumerate() {
            if button.triggered() {
                info!("{now:>4} ms {class} button {index} down");
            } else if button.repeating() {
                info!("{now:>4} ms {class} button {index} repeat");
            }
            if button.released() {
                info!("{now:>4} ms {class} button {index} up");
            }
        }
    }

    let pointer = input.snapshot(DeviceClass::Pointer);
    for axis in MouseAxis::ALL {
        let delta = pointer.axis(axis.index()).value();
        if delta != 0.0 {
            info!("{now:>4} ms pointer {} {delta}", axis.name());
        }
    }

    let pad = input.snapshot(DeviceClass::Analog);
    let lx = pad.axis(PadAxis::LeftX.index()).value();
    let rt = pad.axis(PadAxis::RightTrigger.index()).value();
    if lx != 0.0 || rt != 0.0 {
        info!("{now:>4} ms pad left_x={lx:.3} right_trigger={rt:.3}");
    }
}
