//! HuC6280: 65C02-derived CPU with an 8-bank MMU, block transfer
//! instructions, a 7-bit timer and a three-line interrupt controller.
//!
//! Execution is instruction-granular with cycle-exact accounting: every
//! instruction charges its CPU cycles through [`HuC6280::add_cycles`], which
//! scales them to master clock cycles (12 per cycle at 1.79 MHz, 3 at
//! 7.16 MHz) and fires the timer and the platform event when their deadline
//! passes. Interrupt lines are sampled on the final cycle of every
//! instruction and serviced at the next boundary.

mod addressing;
mod alu;
mod block;
mod branch;
pub mod debug;
mod execute;
pub mod interrupt;
pub mod opcodes;
pub mod snapshot;
mod stack;
pub mod timer;

use serde::{Deserialize, Serialize};

use crate::core::{Bus, BusMaster, bus::InterruptState};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, HuC6280State},
};

pub use addressing::Operand;
pub use block::{BlockKind, BlockTransfer};
pub use debug::{DebugHooks, Register};
pub use interrupt::{InterruptController, Line};
pub use opcodes::{AddressingMode, OPCODE_TABLE, OpcodeInfo};
pub use snapshot::{Snapshot, SnapshotError};
pub use timer::Timer;

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum StatusFlag {
    C = 0x01, // Carry
    Z = 0x02, // Zero
    I = 0x04, // Interrupt Disable
    D = 0x08, // Decimal
    B = 0x10, // Break
    T = 0x20, // Memory operation (SET)
    V = 0x40, // Overflow
    N = 0x80, // Negative
}

pub(crate) const C_FLAG: u8 = StatusFlag::C as u8;
pub(crate) const Z_FLAG: u8 = StatusFlag::Z as u8;
pub(crate) const I_FLAG: u8 = StatusFlag::I as u8;
pub(crate) const D_FLAG: u8 = StatusFlag::D as u8;
pub(crate) const B_FLAG: u8 = StatusFlag::B as u8;
pub(crate) const T_FLAG: u8 = StatusFlag::T as u8;
pub(crate) const V_FLAG: u8 = StatusFlag::V as u8;
pub(crate) const N_FLAG: u8 = StatusFlag::N as u8;

/// Logical address of the zero page (bank 1, offset 0).
pub const ZERO_PAGE: u32 = 0x2000;
/// Logical address of the hardware stack page.
pub const STACK_PAGE: u32 = 0x2100;

/// Master cycles per CPU cycle in low speed (CSL, 1.79 MHz).
pub const LOW_SPEED_CYCLES: u64 = 12;
/// Master cycles per CPU cycle in high speed (CSH, 7.16 MHz).
pub const HIGH_SPEED_CYCLES: u64 = 3;

/// Physical base of page 0xFF, which holds the on-chip I/O registers.
pub(crate) const IO_PAGE: u32 = 0xFF << 13;

/// Z and N flag bits for every byte value.
pub(crate) const ZN_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = if i == 0 {
            Z_FLAG
        } else if i & 0x80 != 0 {
            N_FLAG
        } else {
            0
        };
        i += 1;
    }
    table
};

/// Per-instance options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Decode 0xCB as WAI (stall until an interrupt line is pending)
    /// instead of a NOP.
    pub emulate_wai: bool,
}

/// Outcome of one decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Clear T and continue.
    Next,
    /// SET, PLP and RTI leave T alone.
    KeepT,
    /// A block transfer ran out of budget mid-copy.
    Suspend,
}

pub struct HuC6280 {
    // Registers
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
    /// Only the low 16 bits are architectural. Operand fetches may carry it
    /// past 0xFFFF (into the bank 8 shadow) until the next opcode fetch
    /// masks it.
    pub pc: u32,

    // MMU: entry 8 shadows entry 0
    pub(crate) mpr: [u8; 9],
    pub(crate) page_base: [u32; 9],
    pub(crate) speed: u8,
    pub(crate) master_per_cycle: u64,

    pub(crate) irq: InterruptController,
    pub(crate) timer: Timer,
    pub(crate) block: Option<BlockTransfer>,

    pub(crate) last_opcode: u8,
    pub(crate) io_buffer: u8,
    pub(crate) sleeping: bool,

    // Cycle accounting (master clock)
    pub(crate) timestamp: u64,
    pub(crate) next_event: u64,
    pub(crate) next_user_event: u64,
    pub(crate) run_end: u64,
    pub(crate) step_mode: bool,
    pub(crate) master: BusMaster,

    config: CpuConfig,
    hooks: Option<Box<dyn DebugHooks>>,
}

impl HuC6280 {
    /// Construct a core in its power-on state. The reset vector is fetched
    /// by the first `run`.
    pub fn new(config: CpuConfig) -> Self {
        let mut cpu = Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0,
            p: 0,
            pc: 0,
            mpr: [0; 9],
            page_base: [0; 9],
            speed: 0,
            master_per_cycle: LOW_SPEED_CYCLES,
            irq: InterruptController::new(),
            timer: Timer::new(),
            block: None,
            last_opcode: 0,
            io_buffer: 0xFF,
            sleeping: false,
            timestamp: 0,
            next_event: 0,
            next_user_event: 0,
            run_end: 0,
            step_mode: false,
            master: BusMaster::Cpu(0),
            config,
            hooks: None,
        };
        cpu.power();
        cpu
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// Cold start. Clears registers, the page table and interrupt latches,
    /// then performs [`reset`](Self::reset).
    pub fn power(&mut self) {
        log::debug!("huc6280: power on");
        self.io_buffer = 0xFF;
        self.irq = InterruptController::new();
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.s = 0;
        self.p = 0;
        self.pc = 0;
        self.irq.update_i_mask(self.p);
        self.mpr = [0; 9];
        self.flush_mpr_cache();
        self.speed = 0;
        self.update_speed_cache();
        self.last_opcode = 0;
        self.sleeping = false;
        self.reset();
    }

    /// Warm reset: timer and block-transfer state only, plus the reset line.
    /// Registers are loaded from the reset vector at the next boundary.
    pub fn reset(&mut self) {
        log::debug!("huc6280: reset asserted");
        self.timer.reset();
        self.block = None;
        self.sleeping = false;
        self.irq.assert_reset();
    }

    // --- MMU ---

    pub fn mpr(&self, bank: usize) -> u8 {
        self.mpr[bank & 7]
    }

    /// Debugger write to a page register; the page cache is rebuilt.
    pub fn set_mpr(&mut self, bank: usize, value: u8) {
        self.mpr[bank & 7] = value;
        self.flush_mpr_cache();
    }

    #[inline]
    pub(crate) fn write_mpr(&mut self, index: usize, value: u8) {
        self.mpr[index] = value;
        self.page_base[index] = u32::from(value) << 13;
    }

    pub(crate) fn flush_mpr_cache(&mut self) {
        for index in 0..9 {
            self.write_mpr(index, self.mpr[index & 7]);
        }
    }

    /// Translate a logical address (up to 0x11FFF) into a physical one.
    #[inline]
    pub(crate) fn translate(&self, addr: u32) -> u32 {
        // Logical addresses never exceed 0xFFFF + 0x1FFF, so bank <= 8.
        self.page_base[(addr >> 13) as usize] | (addr & 0x1FFF)
    }

    /// Physical address the current page table maps `logical` to.
    pub fn physical_address(&self, logical: u16) -> u32 {
        self.translate(u32::from(logical))
    }

    // --- Speed ---

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub(crate) fn set_speed(&mut self, speed: u8) {
        self.speed = speed & 1;
        self.update_speed_cache();
    }

    pub(crate) fn update_speed_cache(&mut self) {
        self.master_per_cycle = if self.speed == 1 {
            HIGH_SPEED_CYCLES
        } else {
            LOW_SPEED_CYCLES
        };
    }

    /// Master clock cycles one CPU cycle costs at the current speed.
    pub fn master_cycles_per_cycle(&self) -> u64 {
        self.master_per_cycle
    }

    // --- Accessors ---

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn last_opcode(&self) -> u8 {
        self.last_opcode
    }

    pub fn io_buffer(&self) -> u8 {
        self.io_buffer
    }

    pub fn interrupts(&self) -> &InterruptController {
        &self.irq
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn block_transfer(&self) -> Option<&BlockTransfer> {
        self.block.as_ref()
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn DebugHooks>) {
        self.hooks = Some(hooks);
    }

    pub fn clear_hooks(&mut self) -> Option<Box<dyn DebugHooks>> {
        self.hooks.take()
    }

    #[inline]
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.p = (self.p & !(Z_FLAG | N_FLAG)) | ZN_TABLE[value as usize];
    }

    /// Recompute the I-flag interrupt mask after P changed.
    #[inline]
    pub(crate) fn update_i_mask(&mut self) {
        self.irq.update_i_mask(self.p);
    }

    // --- Cycle accounting ---

    /// Charge `count` CPU cycles at the current speed.
    #[inline]
    pub(crate) fn add_cycles<B: Bus + ?Sized>(&mut self, bus: &mut B, count: u32) {
        self.timestamp += u64::from(count) * self.master_per_cycle;
        if self.timestamp >= self.next_event {
            self.happy_sync(bus);
        }
    }

    #[inline]
    pub(crate) fn add_master_cycles<B: Bus + ?Sized>(&mut self, bus: &mut B, count: u64) {
        self.timestamp += count;
        if self.timestamp >= self.next_event {
            self.happy_sync(bus);
        }
    }

    /// Final bus cycle of an instruction: sample the interrupt lines, then
    /// charge the cycle. Some instructions reach this more than once.
    #[inline]
    pub(crate) fn last_cycle<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.irq.set_external(bus.check_interrupts(self.master));
        self.irq.sample(self.p);
        self.add_cycles(bus, 1);
    }

    /// Timer and platform event catch-up once the event deadline passed.
    pub(crate) fn happy_sync<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.timer_sync();
        if self.timestamp >= self.next_user_event {
            let delay = bus.sync(self.timestamp).max(1);
            self.next_user_event = self.timestamp.saturating_add(delay);
        }
        self.calc_next_event();
    }

    pub(crate) fn calc_next_event(&mut self) {
        self.next_event = self.timer.expiry().min(self.next_user_event);
    }

    /// Charge `count` CPU cycles from outside the core (DMA, wait states).
    pub fn steal_cycles<B: Bus + ?Sized>(&mut self, bus: &mut B, master: BusMaster, count: u32) {
        self.master = master;
        self.add_cycles(bus, count);
    }

    /// Charge raw master clock cycles from outside the core.
    pub fn steal_master_cycles<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        count: u64,
    ) {
        self.master = master;
        self.add_master_cycles(bus, count);
    }

    /// Schedule the platform event `delay` master cycles from now.
    pub fn schedule_event(&mut self, delay: u64) {
        self.next_user_event = self.timestamp.saturating_add(delay);
        self.calc_next_event();
    }

    /// Shift every timestamp down by `base` (frame-relative clocks).
    /// The timer is caught up first so its phase survives the shift.
    pub fn rebase_timestamp(&mut self, base: u64) {
        let base = base.min(self.timestamp);
        self.timer_sync();
        self.timestamp -= base;
        self.timer.last_sync -= base;
        if self.next_user_event != u64::MAX {
            self.next_user_event = self.next_user_event.saturating_sub(base);
        }
        self.run_end = self.run_end.saturating_sub(base);
        self.calc_next_event();
    }

    // --- Memory ---

    #[inline]
    pub(crate) fn rd_mem<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u32) -> u8 {
        let phys = self.translate(addr);
        self.read_phys(bus, phys)
    }

    #[inline]
    pub(crate) fn wr_mem<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u32, data: u8) {
        let phys = self.translate(addr);
        self.write_phys(bus, phys, data);
    }

    /// Opcode or operand byte fetch.
    #[inline]
    pub(crate) fn rd_op<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u32) -> u8 {
        let phys = self.translate(addr);
        bus.fetch_opcode(self.master, phys)
    }

    /// Fetch the byte at PC and advance.
    #[inline]
    pub(crate) fn fetch_operand<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let value = self.rd_op(bus, self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn read_phys<B: Bus + ?Sized>(&mut self, bus: &mut B, phys: u32) -> u8 {
        if phys & !0x1FFF == IO_PAGE {
            match phys & 0x1C00 {
                0x0C00 => {
                    let value = self.timer_read(phys, false);
                    self.io_buffer = value;
                    return value;
                }
                0x1400 => {
                    let value = self.irq_status_read(phys, false);
                    self.io_buffer = value;
                    return value;
                }
                _ => {}
            }
        }
        bus.read(self.master, phys)
    }

    fn write_phys<B: Bus + ?Sized>(&mut self, bus: &mut B, phys: u32, data: u8) {
        if phys & !0x1FFF == IO_PAGE {
            let offset = phys & 0x1FFF;
            if (0x0800..0x1800).contains(&offset) {
                self.io_buffer = data;
            }
            match offset & 0x1C00 {
                0x0C00 => return self.timer_write(phys, data),
                0x1400 => return self.irq_status_write(phys, data),
                _ => {}
            }
        }
        bus.write(self.master, phys, data);
    }

    // --- Execution ---

    /// Run until the budget set by [`run_for`](Self::run_for) is used up, or
    /// for one instruction in step mode. An interrupted block transfer is
    /// resumed first.
    pub fn run<B: Bus + ?Sized>(&mut self, bus: &mut B, master: BusMaster, step_mode: bool) {
        self.master = master;
        self.step_mode = step_mode;
        if self.hooks.is_some() {
            self.run_loop::<true, B>(bus);
        } else {
            self.run_loop::<false, B>(bus);
        }
        self.step_mode = false;
    }

    /// Run for `cycles` master cycles from the current timestamp.
    pub fn run_for<B: Bus + ?Sized>(&mut self, bus: &mut B, master: BusMaster, cycles: u64) {
        self.run_end = self.timestamp.saturating_add(cycles);
        self.run(bus, master, false);
    }

    /// Execute exactly one instruction (or interrupt entry). A block
    /// transfer runs to completion.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B, master: BusMaster) {
        self.run(bus, master, true);
    }

    /// End the current run at the next instruction boundary.
    pub fn exit(&mut self) {
        self.run_end = self.timestamp;
    }

    #[inline]
    pub(crate) fn budget_exhausted(&self) -> bool {
        !self.step_mode && self.timestamp >= self.run_end
    }

    fn run_loop<const DEBUG: bool, B: Bus + ?Sized>(&mut self, bus: &mut B) {
        if self.block.is_some() {
            if self.run_block_transfer(bus, true) == Flow::Suspend {
                return;
            }
            self.p &= !T_FLAG;
            if self.step_mode || self.budget_exhausted() {
                return;
            }
        }

        loop {
            let old_pc = self.pc;

            if DEBUG && self.call_instruction_hook() && self.block.is_some() {
                if self.run_block_transfer(bus, true) == Flow::Suspend {
                    return;
                }
                self.p &= !T_FLAG;
            } else if !self.service_interrupts::<DEBUG, B>(bus, old_pc) {
                self.pc &= 0xFFFF;
                let opcode = self.rd_op(bus, self.pc);
                self.last_opcode = opcode;
                self.pc += 1;

                if DEBUG && log::log_enabled!(log::Level::Trace) {
                    log::trace!(
                        "{:04X}: {:02X} {}",
                        old_pc & 0xFFFF,
                        opcode,
                        OPCODE_TABLE[opcode as usize].mnemonic
                    );
                }

                match self.execute::<DEBUG, B>(bus, opcode) {
                    Flow::Next => self.p &= !T_FLAG,
                    Flow::KeepT => {}
                    Flow::Suspend => return,
                }
            }

            if self.step_mode || self.budget_exhausted() {
                break;
            }
        }
    }

    /// Sync the timer and give the debugger its boundary callback. Returns
    /// true when the hook replaced the CPU state.
    fn call_instruction_hook(&mut self) -> bool {
        self.timer_sync();
        self.calc_next_event();
        let Some(mut hooks) = self.hooks.take() else {
            return false;
        };
        let pc = self.pc as u16;
        let reloaded = hooks.instruction(self, pc);
        if self.hooks.is_none() {
            self.hooks = Some(hooks);
        }
        reloaded
    }

    #[inline]
    pub(crate) fn trace_branch<const DEBUG: bool>(&mut self, from: u32, to: u32, vector: u16) {
        if DEBUG {
            if let Some(hooks) = self.hooks.as_mut() {
                hooks.branch(from as u16, to as u16, vector);
            }
        }
    }
}

impl Default for HuC6280 {
    fn default() -> Self {
        Self::new(CpuConfig::default())
    }
}

impl Cpu for HuC6280 {
    fn power(&mut self) {
        HuC6280::power(self);
    }

    fn reset(&mut self) {
        HuC6280::reset(self);
    }

    fn signal_interrupt(&mut self, int: InterruptState) {
        if int.irq1 {
            self.irq_begin(Line::Irq1);
        } else {
            self.irq_end(Line::Irq1);
        }
        if int.irq2 {
            self.irq_begin(Line::Irq2);
        } else {
            self.irq_end(Line::Irq2);
        }
    }

    fn is_sleeping(&self) -> bool {
        self.sleeping
    }
}

impl CpuStateTrait for HuC6280 {
    type Snapshot = HuC6280State;

    fn snapshot(&self) -> HuC6280State {
        let mut mpr = [0; 8];
        mpr.copy_from_slice(&self.mpr[..8]);
        HuC6280State {
            a: self.a,
            x: self.x,
            y: self.y,
            s: self.s,
            p: self.p,
            pc: self.pc as u16,
            mpr,
            speed: self.speed,
        }
    }
}
