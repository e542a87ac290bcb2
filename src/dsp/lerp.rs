//! Control-rate linear interpolation.
//!
//! [`Lerp`] glides a control value toward a target over a fixed time. The
//! oscillator voice uses it for portamento and pitch bend smoothing, and
//! [`ArEnvelope`] layers a press/release gate on top of it.

/// Shortest glide time in seconds. Shorter rates are clamped up to this.
pub const MIN_RATE: f32 = 0.001;

#[derive(Debug, Clone)]
pub struct Lerp {
    a: f32,
    b: f32,
    position: f32,
    rate: f32,
    value: f32,
}

impl Default for Lerp {
    fn default() -> Self {
        Self::new(0.05, 0.0)
    }
}

impl Lerp {
    pub fn new(rate: f32, value: f32) -> Self {
        Self {
            a: value,
            b: value,
            position: 1.0,
            rate: rate.max(MIN_RATE),
            value,
        }
    }

    /// Current output.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Target the interpolation is heading to.
    pub fn target(&self) -> f32 {
        self.b
    }

    /// Start gliding from the current output to `target`.
    pub fn set_value(&mut self, target: f32) {
        self.a = self.value;
        self.b = target;
        self.position = 0.0;
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Change the glide time. A glide in progress keeps its endpoints.
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.max(MIN_RATE);
    }

    pub fn is_settled(&self) -> bool {
        self.position >= 1.0
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn tick(&mut self, dt: f32) -> f32 {
        if self.position < 1.0 {
            self.position = (self.position + dt / self.rate).min(1.0);
        }
        self.value = self.a + (self.b - self.a) * self.position;
        self.value
    }
}

/// Attack/release envelope for control signals such as filter sweeps.
///
/// Pressing glides to `amount` over `attack_time`; releasing glides back to
/// zero over `release_time`. There is no decay or sustain stage.
#[derive(Debug, Clone)]
pub struct ArEnvelope {
    lerp: Lerp,
    attack_time: f32,
    release_time: f32,
    amount: f32,
    pressed: bool,
}

impl Default for ArEnvelope {
    fn default() -> Self {
        Self::new(0.05, 0.05, 1.0)
    }
}

impl ArEnvelope {
    pub fn new(attack_time: f32, release_time: f32, amount: f32) -> Self {
        Self {
            lerp: Lerp::new(release_time, 0.0),
            attack_time,
            release_time,
            amount,
            pressed: false,
        }
    }

    pub fn press(&mut self) {
        self.pressed = true;
        self.lerp.set_rate(self.attack_time);
        self.lerp.set_value(self.amount);
    }

    pub fn release(&mut self) {
        self.pressed = false;
        self.lerp.set_rate(self.release_time);
        self.lerp.set_value(0.0);
    }

    pub fn pressed(&self) -> bool {
        self.pressed
    }

    pub fn value(&self) -> f32 {
        self.lerp.value()
    }

    pub fn tick(&mut self, dt: f32) -> f32 {
        self.lerp.tick(dt)
    }

    pub fn attack_time(&self) -> f32 {
        self.attack_time
    }

    pub fn set_attack_time(&mut self, value: f32) {
        self.attack_time = value.max(0.0);
        if self.pressed {
            self.lerp.set_rate(self.attack_time);
        }
    }

    pub fn release_time(&self) -> f32 {
        self.release_time
    }

    pub fn set_release_time(&mut self, value: f32) {
        self.release_time = value.max(0.0);
        if !self.pressed {
            self.lerp.set_rate(self.release_time);
        }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn set_amount(&mut self, value: f32) {
        self.amount = value;
        if self.pressed {
            self.lerp.set_value(self.amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glides_linearly_to_target() {
        let mut lerp = Lerp::new(0.1, 0.0);
        lerp.set_value(1.0);

        assert!((lerp.tick(0.05) - 0.5).abs() < 1e-6);
        assert!((lerp.tick(0.05) - 1.0).abs() < 1e-6);
        assert!(lerp.is_settled());
        assert!((lerp.tick(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut lerp = Lerp::new(0.1, 0.0);
        lerp.set_value(1.0);
        lerp.tick(0.05);

        lerp.set_value(0.0);
        assert!((lerp.tick(0.0) - 0.5).abs() < 1e-6);
        assert!((lerp.tick(0.05) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn rate_is_clamped() {
        let mut lerp = Lerp::new(0.0, 0.0);
        assert_eq!(lerp.rate(), MIN_RATE);

        lerp.set_value(2.0);
        assert!((lerp.tick(MIN_RATE) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ar_press_and_release() {
        let mut env = ArEnvelope::new(0.1, 0.2, 500.0);

        env.press();
        assert!(env.pressed());
        env.tick(0.1);
        assert!((env.value() - 500.0).abs() < 1e-3);

        env.release();
        env.tick(0.1);
        assert!((env.value() - 250.0).abs() < 1e-3);
        env.tick(0.1);
        assert!(env.value().abs() < 1e-3);
    }

    #[test]
    fn ar_times_apply_to_the_active_stage() {
        let mut env = ArEnvelope::new(0.1, 0.1, 1.0);
        env.press();
        env.tick(0.05);
        assert!((env.value() - 0.5).abs() < 1e-6);

        // Slower attack mid-ramp; release time is stored for later
        env.set_attack_time(0.2);
        env.set_release_time(0.4);
        env.tick(0.05);
        assert!((env.value() - 0.75).abs() < 1e-6);
        env.tick(0.15);
        assert!((env.value() - 1.0).abs() < 1e-6);

        env.release();
        env.tick(0.1);
        assert!((env.value() - 0.75).abs() < 1e-6);

        // Faster release mid-ramp; attack time does not touch the release
        env.set_release_time(0.2);
        env.set_attack_time(1.0);
        env.tick(0.1);
        assert!((env.value() - 0.25).abs() < 1e-6);
        assert_eq!(env.attack_time(), 1.0);
    }

    #[test]
    fn ar_amount_retargets_only_while_pressed() {
        let mut env = ArEnvelope::new(0.0, 0.0, 1.0);
        env.set_amount(3.0);
        env.tick(0.01);
        assert_eq!(env.value(), 0.0);

        env.press();
        env.tick(0.01);
        env.set_amount(2.0);
        env.tick(0.01);
        assert!((env.value() - 2.0).abs() < 1e-6);
    }
}
