pub mod error;
#[cfg(feature = "hardware")]
pub mod mcp3008;
pub mod util;

use feeder_traits::{Indicator, MotorOutput, OptoSensor, TensionSwitch};

/// Simulated optical sensor replaying a looping waveform.
///
/// The built-in profiles replay one pip's worth of readings, so every feed of
/// whole pips stays aligned with the calibrated phase tables.
pub struct SimulatedOpto {
    waveform: Vec<u16>,
    idx: usize,
}

impl SimulatedOpto {
    pub fn new(waveform: impl Into<Vec<u16>>) -> Self {
        Self {
            waveform: waveform.into(),
            idx: 0,
        }
    }

    /// One forward pip against the calibrated forward table.
    pub fn forward() -> Self {
        Self::new([600, 920, 850, 780, 900])
    }

    /// One backward pip against the calibrated backward table.
    pub fn backward() -> Self {
        Self::new([250, 350, 260, 180, 300])
    }
}

impl OptoSensor for SimulatedOpto {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        if self.waveform.is_empty() {
            return Ok(0);
        }
        let v = self.waveform[self.idx % self.waveform.len()];
        self.idx += 1;
        tracing::trace!(reading = v, "simulated opto sample");
        Ok(v)
    }
}

/// Simulated tension switch: the film comes taut after a fixed number of
/// winds, then slackens again for the next cycle, like the real peeler.
pub struct SimulatedTensionSwitch {
    winds_needed: u32,
    winds: u32,
}

impl SimulatedTensionSwitch {
    pub fn new(winds_needed: u32) -> Self {
        Self {
            winds_needed,
            winds: 0,
        }
    }
}

impl Default for SimulatedTensionSwitch {
    fn default() -> Self {
        Self::new(3)
    }
}

impl TensionSwitch for SimulatedTensionSwitch {
    fn is_tensioned(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        if self.winds >= self.winds_needed {
            self.winds = 0;
            tracing::debug!("simulated film taut");
            return Ok(true);
        }
        self.winds += 1;
        Ok(false)
    }
}

/// Simulated motor output; logs level changes.
pub struct SimulatedMotor {
    name: &'static str,
    level: u8,
}

impl SimulatedMotor {
    pub fn new(name: &'static str) -> Self {
        Self { name, level: 0 }
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

impl MotorOutput for SimulatedMotor {
    fn set_level(&mut self, level: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if level != self.level {
            tracing::debug!(line = self.name, level, "simulated motor level");
        }
        self.level = level;
        Ok(())
    }
}

/// Simulated indicator; logs state changes.
#[derive(Default)]
pub struct SimulatedIndicator {
    active: bool,
}

impl SimulatedIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Indicator for SimulatedIndicator {
    fn set_active(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if on != self.active {
            tracing::debug!(active = on, "simulated indicator");
        }
        self.active = on;
        Ok(())
    }
}

#[cfg(feature = "hardware")]
mod lines {
    use rppal::gpio::{Gpio, InputPin, OutputPin};

    use crate::error::{HwError, Result};
    use crate::mcp3008::Mcp3008;
    use crate::util::duty_for_level;
    use feeder_traits::{Indicator, MotorOutput, OptoSensor, TensionSwitch};

    /// Optical sensor behind one MCP3008 channel.
    pub struct AdcOpto {
        adc: Mcp3008,
        channel: u8,
    }

    impl AdcOpto {
        pub fn new(bus: u8, cs: u8, channel: u8) -> Result<Self> {
            let adc = Mcp3008::new(bus, cs)?;
            Ok(Self { adc, channel })
        }
    }

    impl OptoSensor for AdcOpto {
        fn read(&mut self) -> std::result::Result<u16, Box<dyn std::error::Error + Send + Sync>> {
            self.adc.read_channel(self.channel).map_err(Into::into)
        }
    }

    /// Film tension switch on a GPIO input. The switch closes to ground when
    /// the film is taut, so the line is active-low by default.
    pub struct SwitchLine {
        pin: InputPin,
        active_low: bool,
    }

    impl SwitchLine {
        pub fn new(pin: u8, active_low: bool) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let pin = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_input_pullup();
            Ok(Self { pin, active_low })
        }
    }

    impl TensionSwitch for SwitchLine {
        fn is_tensioned(
            &mut self,
        ) -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
            let taut = if self.active_low {
                self.pin.is_low()
            } else {
                self.pin.is_high()
            };
            Ok(taut)
        }
    }

    /// One motor leg driven by software PWM on a GPIO output.
    pub struct SoftPwmLine {
        pin: OutputPin,
        hz: f64,
    }

    impl SoftPwmLine {
        pub fn new(pin: u8, hz: f64) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let mut pin = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            pin.set_low();
            Ok(Self { pin, hz })
        }
    }

    impl MotorOutput for SoftPwmLine {
        fn set_level(
            &mut self,
            level: u8,
        ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if level == 0 {
                self.pin
                    .clear_pwm()
                    .map_err(|e| HwError::Gpio(e.to_string()))?;
                self.pin.set_low();
                return Ok(());
            }
            self.pin
                .set_pwm_frequency(self.hz, duty_for_level(level))
                .map_err(|e| HwError::Gpio(e.to_string()))?;
            Ok(())
        }
    }

    /// Indicator LED on a GPIO output.
    pub struct LedLine {
        pin: OutputPin,
    }

    impl LedLine {
        pub fn new(pin: u8) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let mut pin = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            pin.set_low();
            Ok(Self { pin })
        }
    }

    impl Indicator for LedLine {
        fn set_active(
            &mut self,
            on: bool,
        ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if on {
                self.pin.set_high();
            } else {
                self.pin.set_low();
            }
            Ok(())
        }
    }
}

#[cfg(feature = "hardware")]
pub use lines::{AdcOpto, LedLine, SoftPwmLine, SwitchLine};
