//! Per-thread log capture for tests.

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub level: Level,
    pub target: String,
    pub message: String,
}

thread_local! {
    static RECORDS: RefCell<Vec<Captured>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS.with(|records| {
            records.borrow_mut().push(Captured {
                level: record.level(),
                target: record.target().to_owned(),
                message: record.args().to_string(),
            })
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Installs the capturing logger and clears this thread's records.
pub fn start() {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Records logged on this thread since [`start`].
pub fn take() -> Vec<Captured> {
    RECORDS.with(|records| std::mem::take(&mut *records.borrow_mut()))
}
