//! Block transfer instructions (TII, TDD, TIN, TIA, TAI).
//!
//! A transfer costs 17 cycles plus 6 per byte and can run for hundreds of
//! thousands of cycles, so it is resumable: when the run budget expires
//! between two bytes the engine parks its progress in [`BlockTransfer`] and
//! `run` returns. The next `run` continues the copy before fetching anything.

use serde::{Deserialize, Serialize};

use super::{Flow, HuC6280};
use crate::core::Bus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Decrement both pointers.
    Tdd,
    /// Alternate source, increment destination.
    Tai,
    /// Increment source, alternate destination.
    Tia,
    /// Increment both pointers.
    Tii,
    /// Increment source, fixed destination.
    Tin,
}

/// Progress of an in-flight block transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTransfer {
    pub kind: BlockKind,
    pub src: u16,
    pub dest: u16,
    /// Bytes left; 0 at the start means 65536.
    pub length: u16,
    /// 0 or 1: offset applied to the alternating pointer.
    pub alternate: u8,
}

impl BlockTransfer {
    /// Logical source and destination of the next byte.
    fn addresses(&self) -> (u32, u32) {
        let src = u32::from(self.src);
        let dest = u32::from(self.dest);
        let alt = u32::from(self.alternate);
        match self.kind {
            BlockKind::Tai => (src + alt, dest),
            BlockKind::Tia => (src, dest + alt),
            _ => (src, dest),
        }
    }

    fn advance(&mut self) {
        match self.kind {
            BlockKind::Tdd => {
                self.src = self.src.wrapping_sub(1);
                self.dest = self.dest.wrapping_sub(1);
            }
            BlockKind::Tai => {
                self.dest = self.dest.wrapping_add(1);
                self.alternate ^= 1;
            }
            BlockKind::Tia => {
                self.src = self.src.wrapping_add(1);
                self.alternate ^= 1;
            }
            BlockKind::Tii => {
                self.src = self.src.wrapping_add(1);
                self.dest = self.dest.wrapping_add(1);
            }
            BlockKind::Tin => {
                self.src = self.src.wrapping_add(1);
            }
        }
    }
}

impl HuC6280 {
    /// Decode a block transfer: save Y, A, X, fetch the three operands and
    /// start copying.
    pub(crate) fn op_block_transfer<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        kind: BlockKind,
    ) -> Flow {
        self.push(bus, self.y);
        self.push(bus, self.a);
        self.push(bus, self.x);

        let src = self.absolute(bus) as u16;
        let dest = self.absolute(bus) as u16;
        let length = self.absolute(bus) as u16;
        self.add_cycles(bus, 14);

        self.block = Some(BlockTransfer {
            kind,
            src,
            dest,
            length,
            alternate: 0,
        });
        self.run_block_transfer(bus, false)
    }

    /// Copy until done or out of budget. With `resume`, the byte copied
    /// just before the previous suspension is counted first.
    pub(crate) fn run_block_transfer<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        resume: bool,
    ) -> Flow {
        let Some(mut transfer) = self.block else {
            return Flow::Next;
        };

        let mut copy_next = !resume;
        loop {
            if copy_next {
                self.add_cycles(bus, 6);
                let (from, to) = transfer.addresses();
                let value = self.rd_mem(bus, from);
                self.wr_mem(bus, to, value);
                transfer.advance();
                self.block = Some(transfer);

                if self.budget_exhausted() {
                    self.timer_sync();
                    log::trace!(
                        "huc6280: {:?} suspended, {} bytes left",
                        transfer.kind,
                        transfer.length
                    );
                    return Flow::Suspend;
                }
            }
            copy_next = true;

            transfer.length = transfer.length.wrapping_sub(1);
            self.block = Some(transfer);
            if transfer.length == 0 {
                break;
            }
        }

        self.block = None;
        self.x = self.pop(bus);
        self.a = self.pop(bus);
        self.y = self.pop(bus);
        self.add_cycles(bus, 2);
        self.last_cycle(bus);
        Flow::Next
    }
}
