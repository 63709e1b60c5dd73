// src/dataset/events.rs

use arrayvec::ArrayVec;

/// Size of one event record.
pub const EVENT_RECORD_LEN: usize = 16;

const TYPE_OFFSET: usize = 0;
const AUX_OFFSET: usize = 4;
const TIMESTAMP_OFFSET: usize = 8;

/// Most auxiliary words an event can carry.
pub const MAX_EVENT_AUX: usize = 4;

/// Event types recorded in the EasyParse event dataset.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum EventType {
    Unknown = 0x00,
    Enabled = 0x01,
    Disabled = 0x02,
    StopTimeReached = 0x03,
    MemoryFull = 0x04,
    WaitForTwistActivation = 0x05,
    TwistActivated = 0x06,
    PowerRemoved = 0x07,
    PowerApplied = 0x08,
    LowBattery = 0x09,
    ClockChangedFrom = 0x0A,
    ClockChangedTo = 0x0B,
    ThresholdConditionMet = 0x0C,
    ThresholdConditionNotMet = 0x0D,
    GatingConditionChanged = 0x0E,
    ScheduleStart = 0x0F,
    ScheduleEnd = 0x10,
    BurstStart = 0x11,
    BurstEnd = 0x12,
    WaveBurstStart = 0x13,
    WaveBurstEnd = 0x14,
    AverageStart = 0x15,
    AverageEnd = 0x16,
    RegimeChanged = 0x17,
    ProfileDowncastStart = 0x18,
    ProfileUpcastStart = 0x19,
    ProfileCastEnd = 0x1A,
    CastDetectionSwitched = 0x1B,
    ExternalPowerSwitched = 0x1C,
    InternalBatterySwitched = 0x1D,
    SensorPowerOn = 0x1E,
    SensorPowerOff = 0x1F,
    SensorError = 0x20,
    SensorRecovered = 0x21,
    DirectionDependentSamplingChanged = 0x22,
    FastSamplingEnabled = 0x23,
    FastSamplingDisabled = 0x24,
    WatchdogReset = 0x25,
    InstrumentReboot = 0x26,
    SerialSessionStarted = 0x27,
    SerialSessionEnded = 0x28,
}

/// Every event type, indexed by its code.
const EVENT_TYPES: [EventType; 0x29] = [
    EventType::Unknown,
    EventType::Enabled,
    EventType::Disabled,
    EventType::StopTimeReached,
    EventType::MemoryFull,
    EventType::WaitForTwistActivation,
    EventType::TwistActivated,
    EventType::PowerRemoved,
    EventType::PowerApplied,
    EventType::LowBattery,
    EventType::ClockChangedFrom,
    EventType::ClockChangedTo,
    EventType::ThresholdConditionMet,
    EventType::ThresholdConditionNotMet,
    EventType::GatingConditionChanged,
    EventType::ScheduleStart,
    EventType::ScheduleEnd,
    EventType::BurstStart,
    EventType::BurstEnd,
    EventType::WaveBurstStart,
    EventType::WaveBurstEnd,
    EventType::AverageStart,
    EventType::AverageEnd,
    EventType::RegimeChanged,
    EventType::ProfileDowncastStart,
    EventType::ProfileUpcastStart,
    EventType::ProfileCastEnd,
    EventType::CastDetectionSwitched,
    EventType::ExternalPowerSwitched,
    EventType::InternalBatterySwitched,
    EventType::SensorPowerOn,
    EventType::SensorPowerOff,
    EventType::SensorError,
    EventType::SensorRecovered,
    EventType::DirectionDependentSamplingChanged,
    EventType::FastSamplingEnabled,
    EventType::FastSamplingDisabled,
    EventType::WatchdogReset,
    EventType::InstrumentReboot,
    EventType::SerialSessionStarted,
    EventType::SerialSessionEnded,
];

impl EventType {
    pub fn from_code(code: u8) -> Option<Self> {
        EVENT_TYPES.get(usize::from(code)).copied()
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether records of this type carry a meaningful auxiliary word.
    pub const fn has_aux(self) -> bool {
        matches!(
            self,
            EventType::ClockChangedFrom
                | EventType::ClockChangedTo
                | EventType::ThresholdConditionMet
                | EventType::ThresholdConditionNotMet
                | EventType::GatingConditionChanged
                | EventType::BurstStart
                | EventType::WaveBurstStart
                | EventType::RegimeChanged
                | EventType::ProfileDowncastStart
                | EventType::ProfileUpcastStart
                | EventType::ProfileCastEnd
                | EventType::ExternalPowerSwitched
                | EventType::InternalBatterySwitched
                | EventType::SensorError
                | EventType::SensorRecovered
                | EventType::DirectionDependentSamplingChanged
        )
    }
}

/// A decoded event record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Raw type code; see [`Event::event_type`].
    pub type_code: u8,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub aux: ArrayVec<u32, MAX_EVENT_AUX>,
}

impl Event {
    /// The event's type, or `None` for codes outside the known table.
    pub fn event_type(&self) -> Option<EventType> {
        EventType::from_code(self.type_code)
    }
}

/// Decodes one event record. `record` must be exactly [`EVENT_RECORD_LEN`] bytes.
pub(super) fn decode_event(record: &[u8]) -> Event {
    let type_code = record[TYPE_OFFSET];
    let mut timestamp = [0u8; 8];
    timestamp.copy_from_slice(&record[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + 8]);

    let mut aux = ArrayVec::new();
    if EventType::from_code(type_code).is_some_and(EventType::has_aux) {
        let mut word = [0u8; 4];
        word.copy_from_slice(&record[AUX_OFFSET..AUX_OFFSET + 4]);
        aux.push(u32::from_le_bytes(word));
    }

    Event {
        type_code,
        timestamp: u64::from_le_bytes(timestamp) as i64,
        aux,
    }
}
