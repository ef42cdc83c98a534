use crate::{
    health::{HealthData, HealthRegister},
    Error,
};

use std::{ffi::CStr, io, mem};

use chrono::Utc;
use log::warn;
use serde::Serialize;

/// Method tag of reports built from the SanDisk CMD56 register.
pub const METHOD: &str = "sandisk";
/// Version placeholder when the kernel can't be queried.
pub const UNKNOWN_VERSION: &str = "vUnknown";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Host metadata stamped on every report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub version: String,
    pub date: String,
    pub device: String,
}

impl Environment {
    /// Capture version and current UTC time for `device`.
    pub fn capture(device: &str) -> Self {
        Environment {
            version: os_version(),
            date: Utc::now().format(DATE_FORMAT).to_string(),
            device: device.to_owned(),
        }
    }
}

/// Health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub version: String,
    pub date: String,
    pub device: String,
    pub method: String,
    pub signature: String,
    #[serde(rename = "SanDisk")]
    pub sandisk: bool,
    #[serde(rename = "manufactureYYMMDD")]
    pub manufacture_yymmdd: String,
    pub health_status_percent_used: u8,
    pub feature_revision: String,
    pub generation_identifier: u8,
    pub product_string: String,
    pub success: bool,
}

impl Report {
    /// Report with every field at its default and `success` cleared.
    pub fn failure(env: Environment) -> Self {
        Report {
            version: env.version,
            date: env.date,
            device: env.device,
            method: METHOD.to_owned(),
            signature: "0x00 0x00".to_owned(),
            sandisk: false,
            manufacture_yymmdd: String::new(),
            health_status_percent_used: 0,
            feature_revision: "0x00".to_owned(),
            generation_identifier: 0,
            product_string: String::new(),
            success: false,
        }
    }

    /// Report built from a decoded register.
    pub fn success(env: Environment, health: &HealthRegister) -> Self {
        Report {
            version: env.version,
            date: env.date,
            device: env.device,
            method: METHOD.to_owned(),
            signature: health.signature(),
            sandisk: health.is_sandisk(),
            manufacture_yymmdd: health.manufacture_date.clone(),
            health_status_percent_used: health.percent_used,
            feature_revision: health.feature_revision_hex(),
            generation_identifier: health.generation_identifier,
            product_string: health.product_string.clone(),
            success: true,
        }
    }

    /// Collapse a register read into a report.
    ///
    /// Card faults become the failure report, bus faults are handed back.
    pub fn assemble<T, S>(
        result: Result<HealthData, Error<T, S>>,
        env: Environment,
    ) -> Result<Self, Error<T, S>> {
        match result {
            Ok(data) => Ok(Report::success(env, &HealthRegister::parse(&data))),
            Err(err) if err.is_card_fault() => Ok(Report::failure(env)),
            Err(err) => Err(err),
        }
    }

    /// Indented JSON rendering.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Kernel release and machine, "v6.1.21-v8+ aarch64".
pub fn os_version() -> String {
    match uname() {
        Ok((release, machine)) => format_version(&release, &machine),
        Err(err) => {
            warn!("Failed to query kernel version: {}", err);
            UNKNOWN_VERSION.to_owned()
        }
    }
}

fn format_version(release: &str, machine: &str) -> String {
    format!("v{} {}", release, machine)
}

fn uname() -> io::Result<(String, String)> {
    // safety: utsname is plain old data, all zeroes is a valid value
    let mut name: libc::utsname = unsafe { mem::zeroed() };

    if unsafe { libc::uname(&mut name) } == -1 {
        return Err(io::Error::last_os_error());
    }

    // safety: uname() NUL terminates every field it fills
    let field = |raw: &[libc::c_char]| {
        unsafe { CStr::from_ptr(raw.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    };

    Ok((field(&name.release[..]), field(&name.machine[..])))
}
