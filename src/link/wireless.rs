//! Wireless-quality driver interface and the Linux `/proc/net/wireless` reader.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

/// Default location of the kernel wireless status report.
pub const PROC_NET_WIRELESS: &str = "/proc/net/wireless";

/// Source of the platform's raw link-quality counter.
///
/// Implementations must never fail loudly: a missing or unreadable counter
/// is reported as `None`.
#[cfg_attr(test, mockall::automock)]
pub trait WirelessQuality: Send + Sync {
    /// Current raw link quality, or `None` if unavailable.
    fn read(&self) -> Option<i32>;
}

/// Reads the link quality of the first interface listed in `/proc/net/wireless`.
///
/// The report has two header lines followed by one line per interface:
///
/// ```text
/// Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
///  face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
///  wlan0: 0000   58.  -52.  -256        0      0      0      0     18        0
/// ```
#[derive(Debug, Clone)]
pub struct ProcNetWireless {
    path: PathBuf,
}

impl Default for ProcNetWireless {
    fn default() -> Self {
        Self::new(PROC_NET_WIRELESS)
    }
}

impl ProcNetWireless {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Extracts the link column of the first interface line.
    fn parse(contents: &str) -> std::result::Result<i32, String> {
        let line = contents
            .lines()
            .nth(2)
            .ok_or_else(|| "no interface line".to_string())?;
        let field = line
            .split_whitespace()
            .nth(2)
            .ok_or_else(|| format!("short interface line: {:?}", line.trim()))?;
        field
            .trim_end_matches('.')
            .parse::<i32>()
            .map_err(|e| format!("bad link value {:?}: {}", field, e))
    }
}

impl WirelessQuality for ProcNetWireless {
    fn read(&self) -> Option<i32> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!("Cannot read {}: {}", self.path.display(), e);
                return None;
            }
        };

        match Self::parse(&contents) {
            Ok(quality) => Some(quality),
            Err(e) => {
                debug!("Cannot parse {}: {}", self.path.display(), e);
                None
            }
        }
    }
}
