use super::HuC6280;
use super::interrupt::Line;

/// Master cycles per timer tick: 1024 CPU cycles at 7.16 MHz.
pub const TIMER_PERIOD: i64 = 1024 * 3;

/// Divider left behind by a hardware reset.
pub const RESET_DIVIDER: i64 = 1024;

/// HuC6280 7-bit down-counting timer.
///
/// | Offset | R/W | Function                                          |
/// |--------|-----|---------------------------------------------------|
/// | 0      |  R  | Counter (bit 7 from the I/O buffer)               |
/// | 0      |  W  | Reload value (7 bits)                             |
/// | 1      |  R  | Counter (same as offset 0)                        |
/// | 1      |  W  | Bit 0: enable; 0->1 reloads the counter at once   |
///
/// The counter steps once per [`TIMER_PERIOD`] master cycles. Stepping below
/// zero raises TIMER and schedules a reload one master cycle later; the
/// reload itself shortens the following period by one cycle.
///
/// The register page sits at physical 0x1FEC00-0x1FEFFF; only address bit 0
/// is decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    /// Current count; -1 while a reload is pending.
    pub value: i32,
    pub load: u8,
    pub enabled: bool,
    pub reloading: bool,
    /// Master cycles left until the next step, as of `last_sync`.
    pub divider: i64,
    pub last_sync: u64,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            value: 0,
            load: 0,
            enabled: false,
            reloading: false,
            divider: 0,
            last_sync: 0,
        }
    }

    pub fn reset(&mut self) {
        self.reloading = false;
        self.divider = RESET_DIVIDER;
        self.load = 0;
        self.value = 0;
        self.enabled = false;
    }

    /// Catch up to `timestamp`. Returns true if the counter wrapped.
    pub fn sync(&mut self, timestamp: u64) -> bool {
        let elapsed = timestamp.saturating_sub(self.last_sync);
        self.divider -= elapsed as i64;
        self.last_sync = timestamp;

        let mut fired = false;
        while self.divider <= 0 {
            let mut reload_div = TIMER_PERIOD;

            if self.reloading {
                self.value = i32::from(self.load);
                reload_div -= 1;
                self.reloading = false;
            } else if self.enabled {
                self.value -= 1;
                if self.value < 0 {
                    self.reloading = true;
                    reload_div = 1;
                    fired = true;
                }
            }

            self.divider += reload_div;
        }
        fired
    }

    /// Timestamp of the next counter step.
    pub fn expiry(&self) -> u64 {
        self.last_sync.saturating_add(self.divider.max(1) as u64)
    }

    pub fn read(&self, io_buffer: u8) -> u8 {
        (self.value as u8) | (io_buffer & 0x80)
    }

    pub fn write(&mut self, address: u32, value: u8) {
        if address & 1 == 0 {
            self.load = value & 0x7F;
        } else {
            let enable = value & 1 != 0;
            if enable && !self.enabled {
                self.divider = TIMER_PERIOD;
                self.value = i32::from(self.load);
            }
            self.enabled = enable;
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl HuC6280 {
    /// Bring the timer up to the current timestamp, raising TIMER on wrap.
    pub(crate) fn timer_sync(&mut self) {
        if self.timer.sync(self.timestamp) {
            self.irq.raise(Line::Timer);
        }
    }

    /// Timer register read; both offsets return the counter. `peek` skips
    /// the catch-up.
    pub fn timer_read(&mut self, _address: u32, peek: bool) -> u8 {
        if !peek {
            self.timer_sync();
            self.calc_next_event();
        }
        self.timer.read(self.io_buffer)
    }

    pub fn timer_write(&mut self, address: u32, value: u8) {
        self.timer_sync();
        self.timer.write(address, value);
        self.calc_next_event();
    }
}
