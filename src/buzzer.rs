//! Piezo buzzer on PWM0: a square wave at the fingering's pitch.
//!
//! Every pad change re-triggers the note; without a new one the buzzer
//! goes quiet after `NOTE_HOLD_MS`.

use defmt::debug;
use embassy_futures::select::{select, Either};
use embassy_nrf::peripherals;
use embassy_nrf::pwm::{Prescaler, SimplePwm};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use saxpad::config::{BUZZER_PWM_CLOCK_HZ, NOTE_HOLD_MS, NOTE_VELOCITY};
use saxpad::tone;

pub struct Buzzer {
    pwm: SimplePwm<'static, peripherals::PWM0>,
}

impl Buzzer {
    pub fn new(pwm: peripherals::PWM0, pin: peripherals::P0_13) -> Self {
        let mut pwm = SimplePwm::new_1ch(pwm, pin);
        // 16 MHz / 16 = BUZZER_PWM_CLOCK_HZ
        pwm.set_prescaler(Prescaler::Div16);
        pwm.disable();
        Self { pwm }
    }

    pub fn play(&mut self, pitch: u8, velocity: u8) {
        let top = tone::pwm_top(pitch, BUZZER_PWM_CLOCK_HZ);
        self.pwm.set_max_duty(top);
        self.pwm.set_duty(0, tone::duty_for_velocity(top, velocity));
        self.pwm.enable();
        debug!("Buzzer: pitch {} ({} Hz)", pitch, tone::freq_hz(pitch));
    }

    pub fn silence(&mut self) {
        self.pwm.disable();
    }
}

/// Sound every note signalled by the session.
pub async fn run(mut buzzer: Buzzer, note: &'static Signal<CriticalSectionRawMutex, u8>) -> ! {
    loop {
        let mut pitch = note.wait().await;
        loop {
            buzzer.play(pitch, NOTE_VELOCITY);
            match select(note.wait(), Timer::after(Duration::from_millis(NOTE_HOLD_MS))).await {
                Either::First(next) => pitch = next,
                Either::Second(()) => {
                    buzzer.silence();
                    break;
                }
            }
        }
    }
}
