//! Pitch code → buzzer frequency.
//!
//! Frequencies are Q16.16 fixed point, built at compile time by repeated
//! semitone multiplication from MIDI note 0 (no `libm` on target).

const SEMITONE_RATIO_Q16: u32 = 69_433; // ≈ 2^(1/12) * 65536
const MIDI0_FREQ_Q16: u32 = 535_809; // 8.1757989156 Hz * 65536

/// Highest pitch code.
pub const MAX_PITCH: u8 = 127;

const fn mul_q16(a: u32, b: u32) -> u32 {
    ((a as u64 * b as u64) >> 16) as u32
}

const fn build_table() -> [u32; 128] {
    let mut table = [0u32; 128];
    let mut freq_q16 = MIDI0_FREQ_Q16;
    let mut i = 0;
    while i < 128 {
        table[i] = freq_q16;
        freq_q16 = mul_q16(freq_q16, SEMITONE_RATIO_Q16);
        i += 1;
    }
    table
}

static FREQ_Q16: [u32; 128] = build_table();

/// Frequency of a pitch code in Q16.16 Hz.  Codes above 127 clamp.
pub fn freq_q16(pitch: u8) -> u32 {
    FREQ_Q16[pitch.min(MAX_PITCH) as usize]
}

/// Frequency of a pitch code rounded to whole Hz.
pub fn freq_hz(pitch: u8) -> u32 {
    (freq_q16(pitch) + (1 << 15)) >> 16
}

/// PWM counter top for a square wave at `pitch`, given the counter clock.
///
/// The nRF PWM counter is 15 bits wide; periods that do not fit are
/// clamped to the maximum.
pub fn pwm_top(pitch: u8, pwm_clock_hz: u32) -> u16 {
    let freq = freq_q16(pitch) as u64;
    let top = ((pwm_clock_hz as u64) << 16) / freq;
    top.min(0x7FFF) as u16
}

/// Duty (counter compare value) for a note velocity: full velocity is a
/// 50 % square wave, lower velocities narrow the pulse.
pub fn duty_for_velocity(top: u16, velocity: u8) -> u16 {
    let velocity = velocity.min(127) as u32;
    ((top as u32 / 2) * velocity / 127) as u16
}
