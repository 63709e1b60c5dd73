// src/instrument/accessors/settings.rs

use core::fmt::Debug;

use super::ERROR_FEATURE_NOT_AVAILABLE;
use crate::common::{
    error::RbrError,
    generation::Generation,
    hal_traits::{InstrumentClock, InstrumentTransport},
};
use crate::instrument::{Instrument, SampleHandler};

/// Spelling of an unset value.
const NOT_AVAILABLE: &str = "n/a";

/// Atmospheric pressure bounds accepted by `set_atmosphere`, dbar.
const ATMOSPHERE_RANGE: core::ops::RangeInclusive<f64> = 0.0..=20.0;

/// Water density bounds accepted by `set_density`, g/cm³.
const DENSITY_RANGE: core::ops::RangeInclusive<f64> = 0.5..=2.0;

/// Fixed values used when deriving depth and sea pressure.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Settings {
    /// Atmospheric pressure, dbar.
    pub atmosphere: f64,
    /// Water density, g/cm³; `None` where the instrument has none.
    pub density: Option<f64>,
}

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// Atmospheric pressure used to compute sea pressure, in dbar.
    pub fn atmosphere(&mut self) -> Result<f64, RbrError<IF::Error>> {
        self.converse(format_args!("settings atmosphere"))?;
        let p = self.required("atmosphere")?;
        Self::value(&p)
    }

    pub fn set_atmosphere(&mut self, dbar: f64) -> Result<(), RbrError<IF::Error>> {
        if !ATMOSPHERE_RANGE.contains(&dbar) {
            return Err(RbrError::InvalidParameter("atmosphere out of range"));
        }
        self.converse(format_args!("settings atmosphere = {}", dbar))
    }

    /// Water density used to compute depth, in g/cm³.
    ///
    /// L2 firmware without the setting answers E0109; that reads as `None`, like an `n/a` value.
    pub fn density(&mut self) -> Result<Option<f64>, RbrError<IF::Error>> {
        match self.converse(format_args!("settings density")) {
            Ok(()) => {}
            Err(RbrError::Hardware { number })
                if number == ERROR_FEATURE_NOT_AVAILABLE && self.generation == Generation::L2 =>
            {
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
        let p = self.required("density")?;
        if p.value == NOT_AVAILABLE {
            return Ok(None);
        }
        Self::value(&p).map(Some)
    }

    pub fn set_density(&mut self, g_per_cm3: f64) -> Result<(), RbrError<IF::Error>> {
        if !DENSITY_RANGE.contains(&g_per_cm3) {
            return Err(RbrError::InvalidParameter("density out of range"));
        }
        self.converse(format_args!("settings density = {}", g_per_cm3))
    }

    /// Both settings in one exchange. A density that is absent or `n/a` reads as `None`.
    pub fn settings(&mut self) -> Result<Settings, RbrError<IF::Error>> {
        let selector = self.all_selector();
        self.converse(format_args!("settings{}", selector))?;

        let atmosphere = self.required("atmosphere")?;
        let atmosphere = Self::value(&atmosphere)?;
        let density = match self.parameters().find_key("density") {
            Some(p) if p.value != NOT_AVAILABLE => Some(Self::value(&p)?),
            _ => None,
        };
        Ok(Settings { atmosphere, density })
    }
}

#[cfg(test)]
mod tests {
    use crate::common::error::RbrError;
    use crate::common::response::MessageKind;
    use crate::instrument::mock::{open_with_id, L2_ID, L3_ID};
    use crate::instrument::Settings;

    #[test]
    fn test_atmosphere() {
        let mut instrument = open_with_id(L3_ID);
        instrument.interface_mut().queue_line("settings atmosphere = 10.1325");
        assert_eq!(instrument.atmosphere().unwrap(), 10.1325);

        instrument.interface_mut().queue_line("settings atmosphere = 10.2");
        instrument.set_atmosphere(10.2).unwrap();
        assert_eq!(instrument.last_command(), "settings atmosphere = 10.2\r\n");
    }

    #[test]
    fn test_out_of_range_rejected_before_sending() {
        let mut instrument = open_with_id(L3_ID);
        assert!(matches!(instrument.set_atmosphere(-1.0), Err(RbrError::InvalidParameter(_))));
        assert!(matches!(instrument.set_density(f64::NAN), Err(RbrError::InvalidParameter(_))));
        assert!(instrument.interface_mut().writes.is_empty());
    }

    #[test]
    fn test_l2_density_not_available_is_none() {
        let mut instrument = open_with_id(L2_ID);
        instrument.interface_mut().queue_line("E0109 feature not available");
        assert_eq!(instrument.density().unwrap(), None);
        assert_eq!(instrument.last_message().kind, MessageKind::Error);
    }

    #[test]
    fn test_l3_density_not_available_is_error() {
        let mut instrument = open_with_id(L3_ID);
        instrument.interface_mut().queue_line("E0109 feature not available");
        assert!(matches!(instrument.density(), Err(RbrError::Hardware { number: 109 })));
    }

    #[test]
    fn test_settings_single_exchange() {
        let mut instrument = open_with_id(L3_ID);
        instrument
            .interface_mut()
            .queue_line("settings atmosphere = 10.1325, density = n/a, avgsalinity = 35");
        assert_eq!(
            instrument.settings().unwrap(),
            Settings { atmosphere: 10.1325, density: None }
        );
        assert_eq!(instrument.interface_mut().writes, [b"settings all\r\n".to_vec()]);
    }

    #[test]
    fn test_l2_settings_without_density() {
        let mut instrument = open_with_id(L2_ID);
        instrument.interface_mut().queue_line("settings atmosphere = 10.2, density = 1.0281");
        assert_eq!(
            instrument.settings().unwrap(),
            Settings { atmosphere: 10.2, density: Some(1.0281) }
        );
        assert_eq!(instrument.last_command(), "settings\r\n");

        instrument.interface_mut().queue_line("settings atmosphere = 10.2");
        assert_eq!(instrument.settings().unwrap().density, None);
    }
}
