//! Device classification and redirection checking
//!
//! Pure functions over the snapshots fetched from the routing subsystem.
//! [`classify`] reduces a flat endpoint list to a [`DeviceStatusSnapshot`]
//! describing which expected devices are present; [`any_inactive`] reports
//! whether any redirection link has stopped forwarding audio.
//!
//! Both are total: empty or unrecognized input produces "absent" results,
//! never errors. No state is carried between polls.

use crate::traits::routing_subsystem::{AudioEndpoint, DataFlow, DefaultRole, RedirectionLink};

/// Friendly-name prefix of the virtual gaming output device
pub const VIRTUAL_GAMING_PREFIX: &str = "SteelSeries Sonar - Gaming";

/// Friendly-name prefix of the virtual chat output device
pub const VIRTUAL_CHAT_PREFIX: &str = "SteelSeries Sonar - Chat";

/// Friendly-name prefix of the virtual microphone device
pub const VIRTUAL_MIC_PREFIX: &str = "SteelSeries Sonar - Microphone";

/// Presence flags for the expected audio topology
///
/// Computed once per poll cycle from the endpoint list and discarded after
/// the reconciliation decision. All flags default to `false`; an endpoint
/// list that contains none of the expected devices yields the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStatusSnapshot {
    /// Virtual gaming output (default multimedia role) present
    pub virtual_output_multimedia_present: bool,

    /// Virtual chat output (default communications role) present
    pub virtual_output_comms_present: bool,

    /// Virtual microphone input present
    pub virtual_input_present: bool,

    /// Physical headset output present
    pub physical_output_present: bool,

    /// Physical headset input present
    pub physical_input_present: bool,
}

impl DeviceStatusSnapshot {
    /// Both physical headset endpoints are present
    pub fn physical_complete(&self) -> bool {
        self.physical_output_present && self.physical_input_present
    }

    /// All three virtual devices are present
    pub fn virtual_complete(&self) -> bool {
        self.virtual_output_multimedia_present
            && self.virtual_output_comms_present
            && self.virtual_input_present
    }

    /// Names of the missing physical endpoints, for log/reason text
    pub fn missing_physical(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.physical_output_present {
            missing.push("output");
        }
        if !self.physical_input_present {
            missing.push("input");
        }
        missing
    }

    /// Names of the missing virtual devices, for log/reason text
    pub fn missing_virtual(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.virtual_output_multimedia_present {
            missing.push("gaming output");
        }
        if !self.virtual_output_comms_present {
            missing.push("chat output");
        }
        if !self.virtual_input_present {
            missing.push("microphone input");
        }
        missing
    }
}

/// The five recognized device categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceCategory {
    VirtualOutputMultimedia,
    VirtualOutputComms,
    VirtualInput,
    PhysicalOutput,
    PhysicalInput,
}

/// Match an endpoint against the category table, first match wins.
///
/// | Category | defaultRole | dataFlow | friendlyName |
/// |---|---|---|---|
/// | virtual output, multimedia | multimedia | render | starts with gaming label |
/// | virtual output, comms | communications | render | starts with chat label |
/// | virtual input | all | capture | starts with mic label |
/// | physical output | console | render | ends with headset suffix |
/// | physical input | console | capture | ends with headset suffix |
///
/// Endpoints matching no row (speakers, webcams, HDMI outputs) return `None`.
fn categorize(endpoint: &AudioEndpoint, headset_suffix: &str) -> Option<DeviceCategory> {
    let name = endpoint.friendly_name.as_str();

    if endpoint.default_role == DefaultRole::Multimedia
        && endpoint.data_flow == DataFlow::Render
        && name.starts_with(VIRTUAL_GAMING_PREFIX)
    {
        return Some(DeviceCategory::VirtualOutputMultimedia);
    }

    if endpoint.default_role == DefaultRole::Communications
        && endpoint.data_flow == DataFlow::Render
        && name.starts_with(VIRTUAL_CHAT_PREFIX)
    {
        return Some(DeviceCategory::VirtualOutputComms);
    }

    if endpoint.default_role == DefaultRole::All
        && endpoint.data_flow == DataFlow::Capture
        && name.starts_with(VIRTUAL_MIC_PREFIX)
    {
        return Some(DeviceCategory::VirtualInput);
    }

    if endpoint.default_role == DefaultRole::Console
        && endpoint.data_flow == DataFlow::Render
        && name.ends_with(headset_suffix)
    {
        return Some(DeviceCategory::PhysicalOutput);
    }

    if endpoint.default_role == DefaultRole::Console
        && endpoint.data_flow == DataFlow::Capture
        && name.ends_with(headset_suffix)
    {
        return Some(DeviceCategory::PhysicalInput);
    }

    None
}

/// Classify an endpoint list into a [`DeviceStatusSnapshot`]
///
/// Each endpoint is matched against the five expected categories; a match
/// sets the corresponding flag. Multiple endpoints may satisfy the same
/// category (any single match suffices, nothing is counted) and the result
/// is independent of input order.
pub fn classify(endpoints: &[AudioEndpoint], headset_suffix: &str) -> DeviceStatusSnapshot {
    let mut snapshot = DeviceStatusSnapshot::default();

    for endpoint in endpoints {
        match categorize(endpoint, headset_suffix) {
            Some(DeviceCategory::VirtualOutputMultimedia) => {
                snapshot.virtual_output_multimedia_present = true;
            }
            Some(DeviceCategory::VirtualOutputComms) => {
                snapshot.virtual_output_comms_present = true;
            }
            Some(DeviceCategory::VirtualInput) => {
                snapshot.virtual_input_present = true;
            }
            Some(DeviceCategory::PhysicalOutput) => {
                snapshot.physical_output_present = true;
            }
            Some(DeviceCategory::PhysicalInput) => {
                snapshot.physical_input_present = true;
            }
            None => {}
        }
    }

    snapshot
}

/// True if at least one redirection link is not running
///
/// Empty list → `false`.
pub fn any_inactive(links: &[RedirectionLink]) -> bool {
    links.iter().any(|link| !link.is_running)
}
