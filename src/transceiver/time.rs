//! GSM frame/timeslot clock.

use std::fmt;

/// Timeslots per TDMA frame.
pub const TIMESLOTS_PER_FRAME: u8 = 8;
/// Frames per hyperframe; frame numbers wrap here.
pub const HYPERFRAME: u32 = 2_715_648;

/// Position in the TDMA structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GsmTime {
    frame: u32,
    timeslot: u8,
}

impl GsmTime {
    pub fn new(frame: u32, timeslot: u8) -> Self {
        Self {
            frame: frame % HYPERFRAME,
            timeslot: timeslot % TIMESLOTS_PER_FRAME,
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn timeslot(&self) -> u8 {
        self.timeslot
    }

    /// Step one timeslot forward.
    pub fn advance(&mut self) {
        self.timeslot += 1;
        if self.timeslot == TIMESLOTS_PER_FRAME {
            self.timeslot = 0;
            self.frame = (self.frame + 1) % HYPERFRAME;
        }
    }
}

impl fmt::Display for GsmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.frame, self.timeslot)
    }
}
