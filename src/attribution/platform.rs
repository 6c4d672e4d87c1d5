use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First iOS release shipping the AdServices framework.
pub const ADSERVICES_MIN_VERSION: OsVersion = OsVersion::new(14, 3, 0);
/// First iOS release where `ADClient.requestAttributionDetails` exists.
pub const IAD_MIN_VERSION: OsVersion = OsVersion::new(10, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Macos,
    Web,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OsVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for OsVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Empty OS version".to_string());
        }

        let mut parts = [0u32; 3];
        for (idx, raw) in trimmed.split('.').enumerate() {
            if idx >= parts.len() {
                return Err(format!("Too many components in OS version: {}", s));
            }
            parts[idx] = raw
                .parse::<u32>()
                .map_err(|e| format!("Invalid OS version '{}': {}", s, e))?;
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl TryFrom<String> for OsVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OsVersion> for String {
    fn from(v: OsVersion) -> Self {
        v.to_string()
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

/// What the host knows about the device. Supplied once when the fetcher is
/// built; the host is the only party able to answer these questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEnvironment {
    pub platform: Platform,
    pub os_version: OsVersion,
    #[serde(default)]
    pub is_simulator: bool,
}

impl DeviceEnvironment {
    pub fn ios(version: OsVersion) -> Self {
        Self {
            platform: Platform::Ios,
            os_version: version,
            is_simulator: false,
        }
    }

    pub fn simulator(mut self) -> Self {
        self.is_simulator = true;
        self
    }

    pub fn supports_legacy_client(&self) -> bool {
        self.platform == Platform::Ios && self.os_version >= IAD_MIN_VERSION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Not iOS; nothing may be attempted.
    Unsupported,
    /// iOS below 14.3; only the iAd client can be asked.
    LegacyOnly,
    /// AdServices first, iAd as fallback.
    Full,
}

impl Capability {
    pub fn probe(env: &DeviceEnvironment) -> Self {
        if env.platform != Platform::Ios {
            return Capability::Unsupported;
        }
        if env.os_version >= ADSERVICES_MIN_VERSION {
            Capability::Full
        } else {
            Capability::LegacyOnly
        }
    }
}
