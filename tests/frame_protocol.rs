use framepoll::backends::{EventSource, ScriptedSource};
use framepoll::{
    key, normalize, Axis, Clock, DeviceClass, InputConfig, InputManager, ManualClock, MouseAxis,
    MouseButton, PadAxis, PadButton, PadRegister, RawEvent,
};

fn keys(input: &InputManager) -> &framepoll::DeviceState {
    input.snapshot(DeviceClass::KeyMatrix)
}

#[test]
fn repeat_cadence_with_fine_polling() {
    let mut input = InputManager::with_defaults();
    let k = key(b'K');
    input
        .enqueue(DeviceClass::KeyMatrix, RawEvent::press(k))
        .unwrap();

    let mut pulses = Vec::new();
    for now in (0..=1000).step_by(10) {
        input.update(now);
        if keys(&input).button(k).repeating() {
            pulses.push(now);
        }
    }

    assert_eq!(pulses, vec![0, 600, 700, 800, 900, 1000]);
}

#[test]
fn repeat_survives_sparse_polling() {
    let mut input = InputManager::with_defaults();
    let k = key(b'K');
    input
        .enqueue(DeviceClass::KeyMatrix, RawEvent::press(k))
        .unwrap();

    let mut seen = Vec::new();
    for now in [0, 650, 1200] {
        input.update(now);
        seen.push(keys(&input).button(k).repeating());
    }
    assert_eq!(seen, vec![true, true, true]);
}

#[test]
fn os_auto_repeat_presses_never_retrigger() {
    let mut input = InputManager::with_defaults();
    let k = key(b'J');

    input
        .enqueue(DeviceClass::KeyMatrix, RawEvent::press(k))
        .unwrap();
    input.update(0);
    assert!(keys(&input).button(k).triggered());

    input.update(16);
    // The OS starts echoing key-down while the key stays held.
    for now in [32, 48, 64] {
        input
            .enqueue(DeviceClass::KeyMatrix, RawEvent::press(k))
            .unwrap();
        input.update(now);
        let b = keys(&input).button(k);
        assert!(b.held());
        assert!(!b.triggered(), "echo at {now} re-triggered");
        assert!(!b.repeating(), "echo at {now} reset repeat timing");
    }

    // Repeat timing still counts from the original trigger.
    input.update(600);
    assert!(keys(&input).button(k).repeating());
}

#[test]
fn release_lands_on_its_own_frame_even_after_a_press() {
    let mut input = InputManager::with_defaults();
    let left = MouseButton::Left.index();

    input
        .enqueue(DeviceClass::Pointer, RawEvent::press(left))
        .unwrap();
    input
        .enqueue(DeviceClass::Pointer, RawEvent::release(left))
        .unwrap();
    input.update(0);

    let b = input.snapshot(DeviceClass::Pointer).button(left);
    assert!(!b.held());
    assert!(b.released());
    assert!(!b.triggered());

    input.update(16);
    assert!(!input.snapshot(DeviceClass::Pointer).button(left).released());
}

#[test]
fn pointer_deltas_sum_per_frame() {
    let mut input = InputManager::with_defaults();
    let y = MouseAxis::DeltaY.index();
    for d in [5, -2, 10] {
        input
            .enqueue(DeviceClass::Pointer, RawEvent::delta(y, d))
            .unwrap();
    }
    input.update(0);
    assert_eq!(input.snapshot(DeviceClass::Pointer).axis(y), Axis::Relative(13));

    input.update(16);
    assert_eq!(input.snapshot(DeviceClass::Pointer).axis(y), Axis::Relative(0));
}

#[test]
fn dead_zone_examples() {
    let v = normalize(3000, 32768.0, 0.05);
    assert!(v > 0.09 && v < 0.093, "got {v}");
    assert_eq!(normalize(1000, 32768.0, 0.1), 0.0);
    assert_eq!(normalize(3000, 32768.0, 0.1), 0.0);
}

#[test]
fn idle_frame_repeats_state_without_edges() {
    let mut input = InputManager::with_defaults();
    input
        .enqueue(DeviceClass::KeyMatrix, RawEvent::press(key(b'Z')))
        .unwrap();
    input
        .enqueue(DeviceClass::Pointer, RawEvent::delta(0, 4))
        .unwrap();
    input.update(200);
    let first = input.snapshot_all();

    input.update(200);
    let second = input.snapshot_all();

    for class in DeviceClass::ALL {
        let (a, b) = (first.get(class), second.get(class));
        for (x, y) in a.buttons().iter().zip(b.buttons()) {
            assert_eq!(x.held(), y.held());
            assert!(!y.triggered() && !y.released());
        }
    }
    assert_eq!(
        second.get(DeviceClass::Pointer).axis(0),
        Axis::Relative(0),
        "relative axes do not carry into an idle frame"
    );
    assert_eq!(first.analog, second.analog);
}

#[test]
fn polled_pad_register_drives_buttons_and_sticks() {
    let mut input = InputManager::with_defaults();
    let a = PadButton::A.index();
    let lx = PadAxis::LeftX.index();

    input
        .enqueue(
            DeviceClass::Analog,
            RawEvent::Register(PadRegister::new(1 << a, vec![-20_000, 0, 0, 0, 0, 200])),
        )
        .unwrap();
    input.update(0);

    let pad = input.snapshot(DeviceClass::Analog);
    assert!(pad.button(a).triggered());
    let x = pad.axis(lx).position().unwrap();
    assert!((x - (-20_000.0 / 32768.0)).abs() < 1e-6);
    let rt = pad.axis(PadAxis::RightTrigger.index()).position().unwrap();
    assert!((rt - 200.0 / 255.0).abs() < 1e-6);

    input
        .enqueue(
            DeviceClass::Analog,
            RawEvent::Register(PadRegister::new(0, vec![100, 0, 0, 0, 0, 0])),
        )
        .unwrap();
    input.update(16);
    let pad = input.snapshot(DeviceClass::Analog);
    assert!(pad.button(a).released());
    assert_eq!(pad.axis(lx), Axis::Absolute(0.0));
}

#[test]
fn scripted_session_with_manual_clock() {
    let config = InputConfig::from_toml_str(
        r#"
        [repeat]
        delay_ms = 200
        period_ms = 50
        "#,
    )
    .unwrap();
    let mut input = InputManager::new(&config).unwrap();
    let clock = ManualClock::new(0);
    let mut script = ScriptedSource::new("session")
        .tap(DeviceClass::KeyMatrix, key(b'D'), 20, 400)
        .at(
            40,
            DeviceClass::Pointer,
            RawEvent::delta(MouseAxis::Wheel.index(), -120),
        );

    let mut pulses = 0;
    let mut wheel = 0;
    while clock.now_ms() <= 500 {
        script.pump(clock.now_ms(), &mut input).unwrap();
        input.update_from(&clock);
        if keys(&input).button(key(b'D')).repeating() {
            pulses += 1;
        }
        wheel += input
            .snapshot(DeviceClass::Pointer)
            .axis(MouseAxis::Wheel.index())
            .delta()
            .unwrap();
        clock.advance(10);
    }

    // Trigger at 20, then boundaries at 270, 320, 370 before the release at 400.
    assert_eq!(pulses, 4);
    assert_eq!(wheel, -120);
    assert!(script.is_finished());
}
