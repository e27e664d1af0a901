use super::HuC6280;

/// Debugger callbacks invoked by the dispatch loop.
///
/// While hooks are installed `run` takes the instrumented path; without
/// them the loop never looks at this trait.
pub trait DebugHooks {
    /// Called at every instruction boundary, after the timer has been
    /// brought up to date. The hook may inspect or replace CPU state
    /// (e.g. load a snapshot); it returns true when it did, so that a
    /// restored block transfer resumes at once.
    fn instruction(&mut self, cpu: &mut HuC6280, pc: u16) -> bool;

    /// Taken branch, jump, return or interrupt entry. `vector` is the
    /// vector address for BRK, interrupts and reset, otherwise 0.
    fn branch(&mut self, _from: u16, _to: u16, _vector: u16) {}
}

/// Registers exposed to debuggers and front ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    Pc,
    A,
    X,
    Y,
    Sp,
    P,
    /// Clock speed select (0 low, 1 high).
    Spd,
    Mpr(u8),
    /// Interrupt disable mask as software reads it.
    IrqMask,
    TimerStatus,
    TimerValue,
    TimerLoad,
    TimerDivider,
}

impl Register {
    pub const ALL: [Register; 20] = [
        Register::Pc,
        Register::A,
        Register::X,
        Register::Y,
        Register::Sp,
        Register::P,
        Register::Spd,
        Register::Mpr(0),
        Register::Mpr(1),
        Register::Mpr(2),
        Register::Mpr(3),
        Register::Mpr(4),
        Register::Mpr(5),
        Register::Mpr(6),
        Register::Mpr(7),
        Register::IrqMask,
        Register::TimerStatus,
        Register::TimerValue,
        Register::TimerLoad,
        Register::TimerDivider,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Register::Pc => "PC",
            Register::A => "A",
            Register::X => "X",
            Register::Y => "Y",
            Register::Sp => "SP",
            Register::P => "P",
            Register::Spd => "SPD",
            Register::Mpr(n) => ["MPR0", "MPR1", "MPR2", "MPR3", "MPR4", "MPR5", "MPR6", "MPR7"]
                [(n & 7) as usize],
            Register::IrqMask => "IRQM",
            Register::TimerStatus => "TIMS",
            Register::TimerValue => "TIMV",
            Register::TimerLoad => "TIML",
            Register::TimerDivider => "TIMD",
        }
    }

    /// Width in bits as shown by a debugger.
    pub fn bits(self) -> u32 {
        match self {
            Register::Pc => 16,
            Register::Spd | Register::TimerStatus => 1,
            Register::IrqMask => 3,
            Register::TimerValue | Register::TimerLoad => 7,
            Register::TimerDivider => 10,
            _ => 8,
        }
    }
}

impl HuC6280 {
    pub fn get_register(&self, reg: Register) -> u32 {
        match reg {
            Register::Pc => self.pc & 0xFFFF,
            Register::A => u32::from(self.a),
            Register::X => u32::from(self.x),
            Register::Y => u32::from(self.y),
            Register::Sp => u32::from(self.s),
            Register::P => u32::from(self.p),
            Register::Spd => u32::from(self.speed),
            Register::Mpr(n) => u32::from(self.mpr[(n & 7) as usize]),
            Register::IrqMask => u32::from(self.irq.disable_mask()),
            Register::TimerStatus => u32::from(self.timer.enabled),
            Register::TimerValue => (self.timer.value as u32) & 0x7F,
            Register::TimerLoad => u32::from(self.timer.load),
            Register::TimerDivider => (self.timer.divider.max(0) as u32) & 1023,
        }
    }

    /// Debugger register write. Values are masked to the register width
    /// and every dependent cache is rebuilt.
    pub fn set_register(&mut self, reg: Register, value: u32) {
        match reg {
            Register::Pc => self.pc = value & 0xFFFF,
            Register::A => self.a = value as u8,
            Register::X => self.x = value as u8,
            Register::Y => self.y = value as u8,
            Register::Sp => self.s = value as u8,
            Register::P => {
                self.p = value as u8;
                self.update_i_mask();
            }
            Register::Spd => self.set_speed(value as u8),
            Register::Mpr(n) => self.set_mpr(usize::from(n & 7), value as u8),
            Register::IrqMask => self.irq.set_disable_mask(value as u8),
            Register::TimerStatus => self.timer.enabled = value & 1 != 0,
            Register::TimerValue => self.timer.value = (value & 0x7F) as i32,
            Register::TimerLoad => self.timer.load = (value & 0x7F) as u8,
            Register::TimerDivider => self.timer.divider = i64::from(value & 1023),
        }
        self.calc_next_event();
    }
}
