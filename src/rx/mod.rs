//! Receiver core: bucket ring, edge capture and the analyze task.

pub(crate) mod bits;
pub mod bucket;
mod edge;
pub mod wave;

use heapless::Vec;

use crate::output::Console;
use crate::proto::{self, fs20, Protocol, Scratch};
use crate::rx::bucket::{Bucket, BucketState};
use crate::rx::wave::Pulse;
use crate::{MAXMSG, RCV_BUCKETS};

/// Scaled counter value after which a frame counts as finished (~64 ms).
pub const SILENCE: u16 = 4000;
/// Repeat window of the duplicate filter, in [`Frontend::ticks`] units
/// (~0.3 s at the reference 125 Hz tick).
pub const REPTIME: u32 = 38;

/// Emit decoded frames at all.
pub const REP_KNOWN: u8 = 0x01;
/// Do not suppress repeated frames.
pub const REP_REPEATED: u8 = 0x02;
/// Emit the `p` diagnostic line per consumed bucket, and `BOVF` on overflow.
pub const REP_BITS: u8 = 0x04;
/// Emit the per-edge `r`/`f` trace and a `.` on silence.
pub const REP_MONITOR: u8 = 0x08;
/// In monitor mode, also emit the raw timing bytes.
pub const REP_BINTIME: u8 = 0x10;
/// Append the RSSI byte to each emitted frame.
pub const REP_RSSI: u8 = 0x20;
/// Do not auto-mark FHT protocol chatter as repeated.
pub const REP_FHTPROTO: u8 = 0x40;
/// Per-edge signal level to an attached LCD (serial fallback without one).
pub const REP_LCDMON: u8 = 0x80;

/// Output filter / verbosity byte (`tx_report`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxReport(pub u8);

impl TxReport {
    pub fn known(self) -> bool {
        self.0 & REP_KNOWN != 0
    }
    pub fn repeated(self) -> bool {
        self.0 & REP_REPEATED != 0
    }
    pub fn bits(self) -> bool {
        self.0 & REP_BITS != 0
    }
    pub fn monitor(self) -> bool {
        self.0 & REP_MONITOR != 0
    }
    pub fn bintime(self) -> bool {
        self.0 & REP_BINTIME != 0
    }
    pub fn rssi(self) -> bool {
        self.0 & REP_RSSI != 0
    }
    pub fn fhtproto(self) -> bool {
        self.0 & REP_FHTPROTO != 0
    }
    pub fn lcdmon(self) -> bool {
        self.0 & REP_LCDMON != 0
    }
}

impl From<u8> for TxReport {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// Collaborators of the receiver core.
///
/// The pulse counter contract: the embedding samples a free-running scaled
/// counter (16 µs units) on every edge and passes the value to
/// [`Receiver::rf_edge`]; the core calls [`Frontend::restart_counter`]
/// whenever a new measurement interval begins.
/// [`arm_timeout`](Frontend::arm_timeout) schedules the silence compare
/// against the same counter; when it fires the embedding calls
/// [`Receiver::rf_silence`].
pub trait Frontend {
    /// Monotonic tick counter for the repeat window (125 Hz on the
    /// reference board).
    fn ticks(&self) -> u32;

    /// Signal strength byte from the radio front-end.
    fn rssi(&mut self) -> u8;

    /// Zero the free-running pulse counter.
    fn restart_counter(&mut self);

    /// Arm the end-of-frame compare to fire after `ticks` scaled units
    /// without a counter restart.
    fn arm_timeout(&mut self, ticks: u16);

    /// Disarm the end-of-frame compare.
    fn clear_timeout(&mut self);

    /// A 768:384 µs router sync burst was recognized. Return true when the
    /// router takes over the reception.
    fn rf_router_sync(&mut self) -> bool {
        false
    }

    /// Invoked with the payload of every decoded FHT frame, including the
    /// ones the repeat filter drops.
    fn fht_frame(&mut self, _payload: &[u8]) {}

    /// True while FHT frames should be dropped (router active, own house
    /// code not configured yet).
    fn fht_blocked(&self) -> bool {
        false
    }

    /// Per-edge signal level on an attached LCD. Return false to fall back
    /// to the serial level character.
    fn lcd_txmon(&mut self, _hightime: Pulse, _lowtime: Pulse) -> bool {
        false
    }
}

/// The receiver: bucket ring, edge-capture scratch and decode state.
///
/// One owned value shared by two contexts: [`rf_edge`](Receiver::rf_edge)
/// and [`rf_silence`](Receiver::rf_silence) run in interrupt context,
/// [`rf_analyze`](Receiver::rf_analyze) in the main loop. Every entry point
/// takes `&mut self`, so the embedding serializes the two contexts
/// (interrupt masking or a critical section) and the ring counters need no
/// atomics under that regime.
pub struct Receiver {
    buckets: [Bucket; RCV_BUCKETS],
    bucket_in: usize,
    bucket_out: usize,
    nrused: u8,
    // edge-context scratch; a pending nonzero lowtime drives the monitor trace
    pub(crate) hightime: Pulse,
    pub(crate) lowtime: Pulse,
    report: TxReport,
    // task-context decode and repeat-filter state
    scratch: Scratch,
    robuf: Vec<u8, MAXMSG>,
    reptime: u32,
    pair_sent: bool,
}

impl Receiver {
    pub const fn new() -> Self {
        const BUCKET: Bucket = Bucket::new();
        Self {
            buckets: [BUCKET; RCV_BUCKETS],
            bucket_in: 0,
            bucket_out: 0,
            nrused: 0,
            hightime: 0,
            lowtime: 0,
            report: TxReport(0),
            scratch: Scratch::new(),
            robuf: Vec::new(),
            reptime: 0,
            pair_sent: false,
        }
    }

    pub fn set_report(&mut self, report: TxReport) {
        self.report = report;
    }

    pub fn report(&self) -> TxReport {
        self.report
    }

    /// True while the current bucket is collecting a frame.
    pub fn is_receiving(&self) -> bool {
        self.buckets[self.bucket_in].state != BucketState::Reset
    }

    /// Number of completed buckets waiting for [`rf_analyze`](Receiver::rf_analyze).
    pub fn pending(&self) -> usize {
        self.nrused as usize
    }

    /// Abort the in-progress reception.
    pub(crate) fn reset_input<F: Frontend>(&mut self, fe: &mut F) {
        fe.clear_timeout();
        self.buckets[self.bucket_in].reset();
        self.pair_sent = false;
    }

    /// Compare-match body: the armed timeout elapsed without an edge, the
    /// current frame is over. Publishes the bucket to the analyze task, or
    /// resets it when it holds less than two bytes (a false alarm) or the
    /// ring is full.
    pub fn rf_silence<F: Frontend, C: Console>(&mut self, fe: &mut F, out: &mut C) {
        fe.clear_timeout();
        if self.report.monitor() {
            out.putc(b'.');
        }

        let b = &self.buckets[self.bucket_in];
        if !b.state.past_sync() || b.byteidx < 2 {
            self.reset_input(fe);
            return;
        }

        if self.nrused as usize + 1 == RCV_BUCKETS {
            // every bucket is full: recycle the current one
            if self.report.bits() {
                out.puts(b"BOVF");
                out.crlf();
            }
            self.reset_input(fe);
        } else {
            self.nrused += 1;
            self.bucket_in += 1;
            if self.bucket_in == RCV_BUCKETS {
                self.bucket_in = 0;
            }
        }
    }

    /// Main-loop task: flush the pending monitor trace, then decode and
    /// emit the oldest completed bucket, if any.
    pub fn rf_analyze<F: Frontend, C: Console>(&mut self, fe: &mut F, out: &mut C) {
        if self.lowtime != 0 {
            if self.report.lcdmon() && !fe.lcd_txmon(self.hightime, self.lowtime) {
                let rssi = fe.rssi();
                let rssi = if rssi >= 128 { rssi - 128 } else { rssi + 128 };
                // drop the low and high 25%, map the rest onto a letter
                let level = if rssi < 64 {
                    0
                } else if rssi >= 192 {
                    15
                } else {
                    rssi.wrapping_sub(80) >> 3
                };
                out.putc(b'a' + level);
            }
            if self.report.monitor() {
                out.putc(b'r');
                if self.report.bintime() {
                    out.putc(self.hightime as u8);
                }
                out.putc(b'f');
                if self.report.bintime() {
                    out.putc(self.lowtime as u8);
                }
            }
            self.lowtime = 0;
        }

        if self.nrused == 0 {
            return;
        }

        let datatype = proto::dispatch(
            &mut self.buckets[self.bucket_out],
            &mut self.scratch,
            self.hightime,
        );

        if let Some(datatype) = datatype {
            if self.report.known() {
                self.emit(datatype, fe, out);
            }
        }

        if self.report.bits() {
            self.print_bucket(fe, out);
        }

        self.buckets[self.bucket_out].reset();
        self.nrused -= 1;
        self.bucket_out += 1;
        if self.bucket_out == RCV_BUCKETS {
            self.bucket_out = 0;
        }

        if datatype == Some(Protocol::Fht) {
            fe.fht_frame(&self.scratch.obuf[..self.scratch.oby]);
        }
    }

    /// Repeat filtering and the actual output line.
    fn emit<F: Frontend, C: Console>(&mut self, datatype: Protocol, fe: &mut F, out: &mut C) {
        let oby = self.scratch.oby;
        let mut isrep = false;

        if !self.report.repeated() {
            // Byte-identical to the previous payload, inside the window?
            // The wrapping subtraction stays correct across tick rollover
            // for any window far below the counter range.
            if self.robuf.len() == oby {
                if self.robuf[..] != self.scratch.obuf[..oby] {
                    self.pair_sent = false;
                } else if fe.ticks().wrapping_sub(self.reptime) < REPTIME {
                    isrep = true;
                }
            }
            self.robuf.clear();
            let _ = self.robuf.extend_from_slice(&self.scratch.obuf[..oby]);
            self.reptime = fe.ticks();
        }

        if datatype == Protocol::Fht
            && !self.report.fhtproto()
            && oby > 4
            && (matches!(
                self.scratch.obuf[2],
                fs20::FHT_ACK
                    | fs20::FHT_ACK2
                    | fs20::FHT_CAN_XMIT
                    | fs20::FHT_CAN_RCV
                    | fs20::FHT_START_XMIT
                    | fs20::FHT_END_XMIT
            ) || self.scratch.obuf[3] & 0x70 == 0x70)
        {
            isrep = true;
        }

        // The short encodings are noise-prone: only trust a frame once the
        // same bytes arrived twice inside the window, and report that pair
        // exactly once.
        let mut ok = if matches!(datatype, Protocol::It | Protocol::Tcm97001) {
            if isrep && !self.pair_sent {
                self.pair_sent = true;
                true
            } else {
                false
            }
        } else {
            !isrep
        };

        if datatype == Protocol::Fht && fe.fht_blocked() {
            ok = false;
        }
        if !ok {
            return;
        }

        out.putc(datatype.tag());
        let mut n = self.scratch.oby;
        if self.scratch.nibble {
            n -= 1;
        }
        for &d in &self.scratch.obuf[..n] {
            out.hex2(d);
        }
        if self.scratch.nibble {
            out.hex1(self.scratch.obuf[n] & 0xf);
        }
        if self.report.rssi() {
            out.hex2(fe.rssi());
        }
        out.crlf();
    }

    /// `p` diagnostic line: state, templates rescaled to µs, sync count,
    /// cursor and the raw bytes.
    fn print_bucket<F: Frontend, C: Console>(&mut self, fe: &mut F, out: &mut C) {
        let b = &self.buckets[self.bucket_out];
        out.putc(b'p');
        out.dec(b.state as u32, 2);
        out.dec(b.zero.hightime as u32 * 16, 5);
        out.dec(b.zero.lowtime as u32 * 16, 5);
        out.dec(b.one.hightime as u32 * 16, 5);
        out.dec(b.one.lowtime as u32 * 16, 5);
        out.dec(b.sync as u32, 3);
        out.dec(b.byteidx as u32, 3);
        out.dec(7 - b.bitidx as u32, 2);
        out.putc(b' ');
        if self.report.rssi() {
            out.hex2(fe.rssi());
            out.putc(b' ');
        }
        let nbytes = b.byteidx as usize + (b.bitidx != 7) as usize;
        for &d in &b.data[..nbytes] {
            out.hex2(d);
        }
        out.crlf();
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}
