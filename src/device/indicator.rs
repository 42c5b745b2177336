use std::fs;
use std::io;
use std::path::PathBuf;

use log::info;

use super::Indicator;

/// Logs mastership changes and nothing else.
#[derive(Default)]
pub struct LogIndicator {
    last: Option<bool>,
}

impl Indicator for LogIndicator {
    fn set_indicator(&mut self, active: bool) -> io::Result<()> {
        if self.last != Some(active) {
            info!("Indicator {}", if active { "on" } else { "off" });
            self.last = Some(active);
        }
        Ok(())
    }
}

/// Drives a GPIO-style value file with `0`/`1`. The file is only rewritten
/// when the state changes.
pub struct FileIndicator {
    path: PathBuf,
    active_low: bool,
    last: Option<bool>,
}

impl FileIndicator {
    pub fn new(path: impl Into<PathBuf>, active_low: bool) -> Self {
        Self {
            path: path.into(),
            active_low,
            last: None,
        }
    }
}

impl Indicator for FileIndicator {
    fn set_indicator(&mut self, active: bool) -> io::Result<()> {
        if self.last == Some(active) {
            return Ok(());
        }
        let level = active != self.active_low;
        fs::write(&self.path, if level { "1" } else { "0" })?;
        self.last = Some(active);
        Ok(())
    }
}
