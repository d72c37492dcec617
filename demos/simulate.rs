// demos/simulate.rs

//! Flies a scripted keyboard session against a simulated airframe.
//!
//! Run with `RUST_LOG=debug cargo run --example simulate` for more detail.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use env_logger::Env;
use quad_stabilization::config::{FlightConfig, SchedulerConfig};
use quad_stabilization::controller::FlightController;
use quad_stabilization::error::SensorError;
use quad_stabilization::hal::{ActuatorSink, Clock, SensorSource};
use quad_stabilization::input::{KeyAction, KeyboardMapper};
use quad_stabilization::scheduler::LoopScheduler;
use quad_stabilization::types::ImuSample;
use quad_stabilization::watchdog::WatchdogVerdict;

const GRAVITY: f32 = 9.81;
const STEP_US: u64 = 1000;
const DURATION_US: u64 = 22_000_000;
const GYRO_BIAS: (f32, f32, f32) = (0.002, -0.001, 0.0015);

/// Key presses and the simulated time they happen at, in milliseconds.
const SCRIPT: &[(u64, &str)] = &[
    (100, "h"),
    (500, "r"),
    (1000, "iiiiiiiiii"),
    (3000, "dd"),
    (5000, "c"),
    (6000, "ee"),
    (7000, "cz"),
    (8000, "t"),
    (9000, "kkkkkkkkkkr"),
    (9500, "iiiiii"),
];

/// Rigid body driven by the motor pulses.
#[derive(Default)]
struct Airframe {
    attitude: (f32, f32, f32),
    rates: (f32, f32, f32),
    pulses: [u16; 4],
}

impl Airframe {
    fn step(&mut self, dt: f32) {
        let [m1, m2, m3, m4] = self.pulses.map(f32::from);
        let torque = (
            (m1 + m2) - (m3 + m4),
            (m2 + m3) - (m1 + m4),
            (m2 + m4) - (m1 + m3),
        );
        let damping = 2.0;
        self.rates.0 += (0.5 * torque.0 - damping * self.rates.0) * dt;
        self.rates.1 += (0.5 * torque.1 - damping * self.rates.1) * dt;
        self.rates.2 += (0.2 * torque.2 - damping * self.rates.2) * dt;
        self.attitude.0 += self.rates.0 * dt;
        self.attitude.1 += self.rates.1 * dt;
        self.attitude.2 += self.rates.2 * dt;
    }

    fn sample(&self) -> ImuSample {
        let (roll, pitch, _) = self.attitude;
        let (roll, pitch) = (roll.to_radians(), pitch.to_radians());
        ImuSample {
            gyro: (
                self.rates.0.to_radians() + GYRO_BIAS.0,
                self.rates.1.to_radians() + GYRO_BIAS.1,
                self.rates.2.to_radians() + GYRO_BIAS.2,
            ),
            accel: (
                -GRAVITY * pitch.sin(),
                GRAVITY * roll.sin() * pitch.cos(),
                GRAVITY * roll.cos() * pitch.cos(),
            ),
        }
    }
}

struct SimImu(Rc<RefCell<Airframe>>);

impl SensorSource for SimImu {
    fn init(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read(&mut self) -> Result<ImuSample, SensorError> {
        Ok(self.0.borrow().sample())
    }
}

struct SimMotors(Rc<RefCell<Airframe>>);

impl ActuatorSink for SimMotors {
    fn write_pulse(&mut self, channel: u8, micros: u16) {
        self.0.borrow_mut().pulses[usize::from(channel - 1)] = micros;
    }
}

#[derive(Default)]
struct SimClock(Cell<u64>);

impl Clock for SimClock {
    fn now_micros(&self) -> u64 {
        self.0.get()
    }
}

struct SimDelay<'a>(&'a SimClock);

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        let clock = &self.0 .0;
        clock.set(clock.get() + u64::from(ns) / 1000);
    }
}

fn print_help() {
    println!("  I/K throttle   A/D roll   W/S pitch   Q/E yaw");
    println!("  R arm   T disarm   C center   X stop   H help   Z status");
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let airframe = Rc::new(RefCell::new(Airframe {
        attitude: (5.0, -3.0, 0.0),
        ..Default::default()
    }));
    let clock = SimClock::default();

    let mut controller = FlightController::new(
        SimImu(airframe.clone()),
        SimMotors(airframe.clone()),
        FlightConfig::default(),
    );
    if let Err(e) = controller.init(&mut SimDelay(&clock)) {
        println!("Initialization failed: {}", e);
        return;
    }

    let mut scheduler = LoopScheduler::new(controller, &clock, SchedulerConfig::default());
    let mut keyboard = KeyboardMapper::new();
    let start = clock.now_micros();
    let mut script = SCRIPT.iter().peekable();

    println!("     t,   Roll,  Pitch,    Yaw, Armed,   M1,   M2,   M3,   M4");
    let mut elapsed = 0;
    while elapsed < DURATION_US {
        while let Some((_, keys)) = script.next_if(|(at_ms, _)| at_ms * 1000 <= elapsed) {
            for key in keys.chars() {
                match KeyAction::from_key(key) {
                    Some(KeyAction::Help) => print_help(),
                    Some(KeyAction::Status) => println!("  Status: {:?}", keyboard.inputs()),
                    _ => {}
                }
                if keyboard.process_key(key) {
                    scheduler.submit(keyboard.take_inputs());
                }
            }
        }

        let report = scheduler.poll();
        if let WatchdogVerdict::Tripped { silence_us } = report.watchdog {
            println!("  Watchdog stop after {:.1} s of silence", silence_us as f32 / 1e6);
        }
        if report.tick.is_some() && elapsed % 500_000 == 0 {
            let state = scheduler.controller().flight_state();
            let [m1, m2, m3, m4] = scheduler.controller().motor_command().pulses;
            println!(
                "{:6.2}, {:6.2}, {:6.2}, {:6.2}, {:5}, {:4}, {:4}, {:4}, {:4}",
                elapsed as f32 / 1e6,
                state.roll,
                state.pitch,
                state.yaw,
                state.armed,
                m1,
                m2,
                m3,
                m4
            );
        }

        airframe.borrow_mut().step(STEP_US as f32 / 1e6);
        elapsed += STEP_US;
        clock.0.set(start + elapsed);
    }

    let stats = scheduler.stats();
    println!(
        "{} ticks, {} skipped, {} overruns, {} watchdog stops",
        stats.ticks, stats.skipped, stats.overruns, stats.watchdog_trips
    );
}
