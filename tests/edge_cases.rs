//! Edge case and boundary condition tests for command translation

use std::thread;

use rigctl::hal::{Call, Op};
use rigctl::{Device, Direction, LightCommand, MotorCommand, Rig, ValidationError};

fn motor(frequency: i64) -> MotorCommand {
    MotorCommand::new(frequency).unwrap()
}

fn calls(rig: &Rig) -> Vec<Call> {
    rig.history().unwrap().calls()
}

fn run_sequence(direction: Op, hz: u32) -> Vec<Call> {
    vec![
        Call::new(Device::Direction, direction),
        Call::new(Device::Motor, Op::Start(50)),
        Call::new(Device::Motor, Op::ChangeFrequency(hz)),
        Call::new(Device::MotorEnable, Op::On),
    ]
}

fn stop_sequence() -> Vec<Call> {
    vec![
        Call::new(Device::MotorEnable, Op::Off),
        Call::new(Device::Motor, Op::Stop),
    ]
}

// ============================================================================
// Boundary Value Tests
// ============================================================================

#[test]
fn motor_range_boundaries() {
    assert!(MotorCommand::new(2000).is_ok());
    assert!(MotorCommand::new(-1999).is_ok());
    assert_eq!(
        MotorCommand::new(-2000),
        Err(ValidationError::FrequencyOutOfRange(-2000))
    );
    assert_eq!(
        MotorCommand::new(2001),
        Err(ValidationError::FrequencyOutOfRange(2001))
    );
    assert!(MotorCommand::new(i64::MAX).is_err());
    assert!(MotorCommand::new(i64::MIN).is_err());
}

#[test]
fn light_range_boundaries() {
    assert!(LightCommand::new(0).is_ok());
    assert!(LightCommand::new(100).is_ok());
    assert_eq!(
        LightCommand::new(-1),
        Err(ValidationError::BrightnessOutOfRange(-1))
    );
    assert_eq!(
        LightCommand::new(101),
        Err(ValidationError::BrightnessOutOfRange(101))
    );
}

#[test]
fn smallest_speeds_still_run() {
    for (frequency, direction) in [(1, Op::Off), (-1, Op::On)] {
        let rig = Rig::simulated();
        rig.apply_motor(motor(frequency)).unwrap();
        assert_eq!(calls(&rig), run_sequence(direction, 1));
    }
}

// ============================================================================
// Sweeps
// ============================================================================

#[test]
fn every_negative_frequency_runs_counter_clockwise() {
    for frequency in (-1999..0).step_by(37).chain([-1]) {
        let rig = Rig::simulated();
        rig.apply_motor(motor(frequency)).unwrap();

        let hz = frequency.unsigned_abs() as u32;
        assert_eq!(calls(&rig), run_sequence(Op::On, hz), "f={}", frequency);

        let state = rig.state();
        assert!(state.motor_enabled);
        assert_eq!(state.direction, Direction::CounterClockwise);
        assert_eq!(state.motor_frequency_hz, hz);
    }
}

#[test]
fn every_positive_frequency_runs_clockwise() {
    for frequency in (1..=2000).step_by(41).chain([2000]) {
        let rig = Rig::simulated();
        rig.apply_motor(motor(frequency)).unwrap();

        assert_eq!(
            calls(&rig),
            run_sequence(Op::Off, frequency as u32),
            "f={}",
            frequency
        );
        assert_eq!(rig.state().direction, Direction::Clockwise);
    }
}

#[test]
fn zero_always_stops_without_touching_direction() {
    for prior in [None, Some(-1999), Some(-1), Some(1), Some(2000)] {
        let rig = Rig::simulated();
        if let Some(frequency) = prior {
            rig.apply_motor(motor(frequency)).unwrap();
        }
        let before = rig.state().direction;
        rig.history().unwrap().clear();

        rig.apply_motor(motor(0)).unwrap();

        assert_eq!(calls(&rig), stop_sequence(), "prior={:?}", prior);
        let state = rig.state();
        assert!(!state.motor_enabled);
        assert!(!state.motor_running);
        assert_eq!(state.direction, before);
    }
}

#[test]
fn every_brightness_is_one_light_call() {
    let rig = Rig::simulated();
    for brightness in 0..=100u8 {
        rig.history().unwrap().clear();
        rig.apply_light(LightCommand::new(brightness).unwrap())
            .unwrap();
        assert_eq!(
            calls(&rig),
            vec![Call::new(Device::Light, Op::ChangeDutyCycle(brightness))]
        );
    }
    assert_eq!(rig.state().light_duty, 100);
}

// ============================================================================
// Repetition
// ============================================================================

#[test]
fn repeated_command_repeats_sequence() {
    for frequency in [-1500, 0, 750] {
        let rig = Rig::simulated();
        rig.apply_motor(motor(frequency)).unwrap();
        let once = calls(&rig);
        let state = rig.state();

        rig.apply_motor(motor(frequency)).unwrap();
        let twice = calls(&rig);

        assert_eq!(twice.len(), once.len() * 2);
        assert_eq!(&twice[once.len()..], &once[..]);
        assert_eq!(rig.state(), state);
    }
}

#[test]
fn light_leaves_motor_alone() {
    let rig = Rig::simulated();
    rig.apply_motor(motor(-800)).unwrap();
    let motor_state = rig.state();

    rig.apply_light(LightCommand::new(33).unwrap()).unwrap();

    let state = rig.state();
    assert_eq!(state.motor_enabled, motor_state.motor_enabled);
    assert_eq!(state.direction, motor_state.direction);
    assert_eq!(state.motor_frequency_hz, motor_state.motor_frequency_hz);
    assert_eq!(state.light_duty, 33);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn concurrent_motor_commands_never_interleave() {
    let rig = Rig::simulated();

    thread::scope(|s| {
        for t in 0..8i64 {
            let rig = &rig;
            s.spawn(move || {
                for i in 0..6i64 {
                    let frequency = match (t + i) % 3 {
                        0 => 0,
                        1 => -(100 + t * 10 + i),
                        _ => 100 + t * 10 + i,
                    };
                    rig.apply_motor(motor(frequency)).unwrap();
                    rig.apply_light(LightCommand::new(t * 10 + i).unwrap())
                        .unwrap();
                }
            });
        }
    });

    let motor_calls: Vec<Call> = calls(&rig)
        .into_iter()
        .filter(|call| call.device != Device::Light)
        .collect();

    let mut rest = &motor_calls[..];
    let mut sequences = 0;
    while !rest.is_empty() {
        match rest[0] {
            Call {
                device: Device::Direction,
                ..
            } => {
                let hz = match rest[2].op {
                    Op::ChangeFrequency(hz) => hz,
                    other => panic!("expected frequency change, got {:?}", other),
                };
                assert_eq!(&rest[..4], &run_sequence(rest[0].op, hz)[..]);
                rest = &rest[4..];
            }
            _ => {
                assert_eq!(&rest[..2], &stop_sequence()[..]);
                rest = &rest[2..];
            }
        }
        sequences += 1;
    }
    assert_eq!(sequences, 48);
}

#[test]
fn resume_never_replays_a_superseded_frequency() {
    let rig = Rig::simulated();

    thread::scope(|s| {
        let rig = &rig;
        s.spawn(move || {
            for i in 0..25 {
                rig.apply_motor(motor(300 + i)).unwrap();
            }
        });
        s.spawn(move || {
            for _ in 0..25 {
                rig.resume_motor().unwrap();
            }
        });
    });

    let frequencies: Vec<u32> = calls(&rig)
        .iter()
        .filter_map(|call| match call.op {
            Op::ChangeFrequency(hz) => Some(hz),
            _ => None,
        })
        .collect();
    assert_eq!(frequencies.len(), 50);

    // Each run either repeats the one before it (resume) or is a new, higher command
    let mut highest = 0;
    for (i, &hz) in frequencies.iter().enumerate() {
        let repeat = i > 0 && hz == frequencies[i - 1];
        assert!(repeat || hz > highest, "stale {} at {}: {:?}", hz, i, frequencies);
        highest = highest.max(hz);
    }
}
