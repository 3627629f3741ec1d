//! Burst consumers fed by the transceiver worker.

use crate::radio::types::RadioBurst;
use crate::transceiver::time::GsmTime;

/// Receiver of timestamped bursts.
///
/// All methods run on the worker thread.
pub trait BurstSink: Send {
    /// Called once before the first burst.
    fn started(&mut self) {}

    fn consume(&mut self, time: GsmTime, burst: RadioBurst);

    /// Called once after the last burst, including drained ones.
    fn stopped(&mut self) {}
}

/// Bursts between power reports.
const REPORT_EVERY: u64 = 1024;

/// Default sink: tracks received power per burst.
#[derive(Debug, Default)]
pub struct PowerMeter {
    bursts: u64,
    peak_db: Option<f32>,
    last_db: Option<f32>,
}

impl PowerMeter {
    pub fn bursts(&self) -> u64 {
        self.bursts
    }

    /// Power of the most recent burst, dBFS.
    pub fn last_db(&self) -> Option<f32> {
        self.last_db
    }

    pub fn peak_db(&self) -> Option<f32> {
        self.peak_db
    }
}

fn to_db(power: f32) -> f32 {
    10.0 * power.max(1e-12).log10()
}

impl BurstSink for PowerMeter {
    fn consume(&mut self, time: GsmTime, burst: RadioBurst) {
        let db = to_db(burst.mean_power());
        self.bursts += 1;
        self.last_db = Some(db);
        self.peak_db = Some(self.peak_db.map_or(db, |p| p.max(db)));

        if self.bursts % REPORT_EVERY == 0 {
            tracing::debug!(time = %time, power_db = db, bursts = self.bursts, "Receive power");
        }
    }

    fn stopped(&mut self) {
        tracing::debug!(bursts = self.bursts, peak_db = ?self.peak_db, "Power meter stopped");
    }
}
