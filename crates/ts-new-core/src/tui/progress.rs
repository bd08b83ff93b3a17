//! Spinner-backed progress reporting

use crate::progress::{EntryKind, Progress};
use cliclack::ProgressBar;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Shows one cliclack spinner per step
#[derive(Default)]
pub struct SpinnerProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Progress for SpinnerProgress {
    fn start(&self, message: &str) {
        let spinner = cliclack::spinner();
        spinner.start(message);
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(spinner) {
                previous.clear();
            }
        }
    }

    fn succeed(&self, message: &str) {
        if let Some(spinner) = self.take() {
            spinner.stop(message);
        }
    }

    fn fail(&self, message: &str) {
        if let Some(spinner) = self.take() {
            spinner.error(message);
        }
    }

    fn warn(&self, message: &str) {
        let _ = cliclack::log::warning(message);
    }

    fn created(&self, kind: EntryKind, path: &Path) {
        debug!(kind = kind.label(), path = %path.display(), "created");
        if let Ok(slot) = self.spinner.lock() {
            if let Some(spinner) = slot.as_ref() {
                let name = path.file_name().unwrap_or(path.as_os_str());
                spinner.set_message(format!(
                    "Created {} {}",
                    kind.label(),
                    name.to_string_lossy()
                ));
            }
        }
    }
}
