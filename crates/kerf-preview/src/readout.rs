//! Live machine values polled by the presentation side.

use crate::collab::{MachineState, Point3};

/// Last values read from the machine, refreshed on the readout timer.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct LiveReadout {
    pub machine: Point3,
    pub work: Point3,
    pub offset: Point3,
    pub feed: f32,
    pub speed: f32,
    /// Set once any nonzero feed or speed has been seen; never cleared.
    pub feed_speed_seen: bool,
}

impl LiveReadout {
    pub fn poll(&mut self, machine: &dyn MachineState) {
        self.machine = machine.machine_position();
        self.work = machine.work_position();
        self.offset = machine.working_offset();
        self.feed = machine.feed();
        self.speed = machine.speed();
        if self.feed != 0.0 || self.speed != 0.0 {
            self.feed_speed_seen = true;
        }
    }

    #[inline]
    pub fn has_offset(&self) -> bool {
        !self.offset.is_zero()
    }

    /// Any Z reading worth a column.
    #[inline]
    pub fn has_z(&self) -> bool {
        self.work.z != 0.0 || self.machine.z != 0.0
    }
}
