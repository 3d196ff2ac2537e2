/// Spell system configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellConfig {
    /// Seconds between channel pulses for channeled spells whose definition
    /// leaves `channel_interval` at zero.
    pub channel_pulse_interval: f64,
}

impl SpellConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of threshold steps a single ability can chain.
    pub const MAX_THRESHOLDS: usize = 8;
    /// Maximum number of phases a multiphase ability can schedule.
    pub const MAX_PHASES: usize = 8;

    /// Phase value meaning "no phase" (or "every phase") outside multiphase casts.
    pub const NO_PHASE: u8 = u8::MAX;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CHANNEL_PULSE_INTERVAL: f64 = 1.0;

    pub fn new() -> Self {
        Self {
            channel_pulse_interval: Self::DEFAULT_CHANNEL_PULSE_INTERVAL,
        }
    }

    pub fn with_channel_pulse_interval(channel_pulse_interval: f64) -> Self {
        Self {
            channel_pulse_interval,
        }
    }
}

impl Default for SpellConfig {
    fn default() -> Self {
        Self::new()
    }
}
