//! Save-state support.
//!
//! [`Snapshot`] carries every piece of architectural and scheduling state.
//! Scheduling timestamps are stored relative to the CPU clock, so a snapshot
//! restores correctly into a core whose timestamp is elsewhere.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::block::{BlockKind, BlockTransfer};
use super::interrupt::RESET;
use super::HuC6280;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed CPU snapshot: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub pc: u16,
    pub a: u8,
    pub p: u8,
    pub i_flag_sample: bool,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub last_opcode: u8,

    pub irq_sample: u8,
    pub irq_pending: u8,
    /// Disable mask as software reads it.
    pub irq_mask: u8,

    pub mpr: [u8; 8],
    pub speed: u8,

    pub timer_reloading: bool,
    pub timer_enabled: bool,
    pub timer_value: i32,
    pub timer_load: u8,
    /// Master cycles until the next counter step.
    pub timer_divider: i64,

    pub block_kind: Option<BlockKind>,
    pub block_src: u16,
    pub block_dest: u16,
    pub block_length: u16,
    pub block_alternate: u8,

    /// Master cycles until the next scheduled event.
    pub next_event: u64,
    /// Master cycles until the platform event.
    pub next_user_event: u64,

    pub io_buffer: u8,
}

impl Snapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn to_bytes_pretty(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl HuC6280 {
    pub fn save_state(&self) -> Snapshot {
        let mut mpr = [0; 8];
        mpr.copy_from_slice(&self.mpr[..8]);
        let block = self.block;

        Snapshot {
            pc: self.pc as u16,
            a: self.a,
            p: self.p,
            i_flag_sample: self.irq.i_flag_sample,
            x: self.x,
            y: self.y,
            s: self.s,
            last_opcode: self.last_opcode,
            irq_sample: self.irq.sample,
            irq_pending: self.irq.latched,
            irq_mask: self.irq.disable_mask(),
            mpr,
            speed: self.speed,
            timer_reloading: self.timer.reloading,
            timer_enabled: self.timer.enabled,
            timer_value: self.timer.value,
            timer_load: self.timer.load,
            timer_divider: self.timer.divider
                - self.timestamp.saturating_sub(self.timer.last_sync) as i64,
            block_kind: block.map(|t| t.kind),
            block_src: block.map_or(0, |t| t.src),
            block_dest: block.map_or(0, |t| t.dest),
            block_length: block.map_or(0, |t| t.length),
            block_alternate: block.map_or(0, |t| t.alternate),
            next_event: self.next_event.saturating_sub(self.timestamp),
            next_user_event: self.next_user_event.saturating_sub(self.timestamp),
            io_buffer: self.io_buffer,
        }
    }

    /// Replace the whole CPU state. Out-of-range values are clamped and
    /// every cache is rebuilt.
    pub fn load_state(&mut self, state: &Snapshot) {
        self.pc = u32::from(state.pc);
        self.a = state.a;
        self.p = state.p;
        self.x = state.x;
        self.y = state.y;
        self.s = state.s;
        self.last_opcode = state.last_opcode;

        self.irq.i_flag_sample = state.i_flag_sample;
        self.irq.sample = state.irq_sample & (RESET | 0x07);
        self.irq.latched = state.irq_pending & (RESET | 0x07);
        self.irq.set_disable_mask(state.irq_mask);

        self.mpr[..8].copy_from_slice(&state.mpr);
        self.flush_mpr_cache();

        if state.speed > 1 {
            log::warn!("huc6280: snapshot speed {} clamped", state.speed);
        }
        self.speed = state.speed & 1;
        self.update_speed_cache();

        self.timer.reloading = state.timer_reloading;
        self.timer.enabled = state.timer_enabled;
        if !(-1..=0x7F).contains(&state.timer_value) {
            log::warn!("huc6280: snapshot timer value {} clamped", state.timer_value);
        }
        self.timer.value = state.timer_value.clamp(-1, 0x7F);
        self.timer.load = state.timer_load & 0x7F;
        if state.timer_divider < 1 {
            log::warn!("huc6280: snapshot timer divider {} clamped", state.timer_divider);
        }
        self.timer.divider = state.timer_divider.max(1);
        self.timer.last_sync = self.timestamp;

        self.block = state.block_kind.map(|kind| BlockTransfer {
            kind,
            src: state.block_src,
            dest: state.block_dest,
            length: state.block_length,
            alternate: state.block_alternate & 1,
        });

        self.next_user_event = self.timestamp.saturating_add(state.next_user_event);
        self.next_event = self.timestamp.saturating_add(state.next_event);
        self.io_buffer = state.io_buffer;
        self.sleeping = false;

        self.update_i_mask();
        log::debug!("huc6280: state loaded, pc={:04X}", self.pc);
    }

    /// Combined save/restore entry point. `load` decodes `buffer` into the
    /// CPU; otherwise the current state is encoded into it. `data_only`
    /// selects the compact encoding when saving; both decode the same.
    pub fn state_action(
        &mut self,
        buffer: &mut Vec<u8>,
        load: bool,
        data_only: bool,
    ) -> Result<(), SnapshotError> {
        if load {
            let state = Snapshot::from_bytes(buffer)?;
            self.load_state(&state);
        } else {
            let state = self.save_state();
            *buffer = if data_only {
                state.to_bytes()?
            } else {
                state.to_bytes_pretty()?
            };
        }
        Ok(())
    }
}
