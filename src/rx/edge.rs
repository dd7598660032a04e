//! Edge-interrupt state machine: sync acquisition, cell template learning
//! and per-state bit demodulation.

use crate::rx::bucket::BucketState;
use crate::rx::wave::{check_rf_sync, tscale, Pulse, Wave, TDIFF};
use crate::rx::{Frontend, Receiver, SILENCE};

impl Receiver {
    /// Edge-interrupt body.
    ///
    /// `rising` is true when the line went low to high; `count` is the
    /// scaled free-running counter sampled at the edge. On a falling edge
    /// the high time is recorded; on a rising edge the completed
    /// `(hightime, lowtime)` pair is fed to the classifier. The HMS/ESA
    /// encodings carry a bit in every half-period and take the inverse
    /// path: bits are appended on the falling edge as well.
    pub fn rf_edge<F: Frontend>(&mut self, rising: bool, count: Pulse, fe: &mut F) {
        let state = self.buckets[self.bucket_in].state;

        // Half-bit encodings: short glitches merge into the running
        // period, overlong periods abort the frame.
        if state == BucketState::Hms {
            if count < tscale(750) {
                return;
            }
            if count > tscale(1250) {
                self.reset_input(fe);
                return;
            }
        }
        #[cfg(feature = "esa")]
        if state == BucketState::Esa {
            if count < tscale(375) {
                return;
            }
            if count > tscale(625) {
                self.reset_input(fe);
                return;
            }
        }

        if !rising {
            if matches!(state, BucketState::Hms | BucketState::Esa) {
                self.collect_bit(true, fe);
                fe.restart_counter();
            }
            self.hightime = count;
            return;
        }

        self.lowtime = count.wrapping_sub(self.hightime);
        fe.restart_counter();
        let (hightime, lowtime) = (self.hightime, self.lowtime);

        #[cfg(feature = "it")]
        if matches!(state, BucketState::It | BucketState::ItV3) {
            let b = &mut self.buckets[self.bucket_in];
            if lowtime > tscale(3000) {
                b.sync = 0;
                return;
            }
            if b.sync == 0 {
                if lowtime > tscale(2400) {
                    // start bit of a V3 frame
                    b.state = BucketState::ItV3;
                    fe.restart_counter();
                    return;
                }
                b.sync = 1;
                if b.state == BucketState::ItV3 {
                    b.zero = if lowtime as i32 - 1 > hightime as i32 {
                        Wave::new(hightime, lowtime)
                    } else {
                        Wave::new(hightime, hightime.wrapping_mul(5))
                    };
                    b.one = Wave::new(hightime, hightime);
                } else {
                    if hightime as i32 * 2 > lowtime as i32 {
                        // high and low too close to tell apart
                        b.state = BucketState::Reset;
                        return;
                    }
                    b.zero = Wave::new(hightime, lowtime + 1);
                    b.one = Wave::new(lowtime + 1, hightime);
                }
                // the trained pulse falls through and is classified below
            }
        }

        #[cfg(feature = "tcm97001")]
        {
            let b = &mut self.buckets[self.bucket_in];
            if b.state == BucketState::Tcm97001 && b.sync == 0 {
                b.sync = 1;
                b.zero.hightime = hightime;
                b.one.hightime = hightime;
                b.zero.lowtime = lowtime;
                b.one.lowtime = if lowtime < 187 { lowtime * 2 } else { lowtime / 2 };
            }
        }

        if matches!(
            self.buckets[self.bucket_in].state,
            BucketState::Hms | BucketState::Esa
        ) {
            self.collect_bit(false, fe);
            return;
        }

        #[cfg(feature = "revolt")]
        if hightime > tscale(9000)
            && hightime < tscale(12000)
            && lowtime > tscale(150)
            && lowtime < tscale(540)
        {
            let b = &mut self.buckets[self.bucket_in];
            b.zero = Wave::new(6, 14);
            b.one = Wave::new(19, 14);
            b.sync = 1;
            b.state = BucketState::Revolt;
            b.rewind();
            fe.arm_timeout(SILENCE);
            return;
        }

        match self.buckets[self.bucket_in].state {
            BucketState::Reset => self.sync_open(fe),
            BucketState::Sync => self.sync_progress(fe),
            #[cfg(feature = "revolt")]
            BucketState::Revolt => {
                let bit = hightime >= 11;
                let b = &mut self.buckets[self.bucket_in];
                if bit {
                    b.one.average(hightime, lowtime);
                } else {
                    b.zero.average(hightime, lowtime);
                }
                self.collect_bit(bit, fe);
            }
            #[cfg(feature = "tcm97001")]
            BucketState::Tcm97001 => {
                // out-of-window pulses are dropped, not fatal
                if lowtime > 110 && lowtime < 140 {
                    self.buckets[self.bucket_in].zero.average(hightime, lowtime);
                    self.collect_bit(false, fe);
                } else if lowtime > 230 && lowtime < 270 {
                    self.buckets[self.bucket_in].one.average(hightime, lowtime);
                    self.collect_bit(true, fe);
                }
            }
            #[cfg(feature = "it")]
            BucketState::ItV3 => {
                let bit = lowtime as i32 - TDIFF as i32 > hightime as i32;
                self.collect_bit(bit, fe);
            }
            st => {
                // Collect and InterTechno V1: match against the learned cells
                let tol = st.tolerance();
                let (is_one, is_zero) = {
                    let b = &self.buckets[self.bucket_in];
                    (
                        b.one.matches(hightime, lowtime, tol),
                        b.zero.matches(hightime, lowtime, tol),
                    )
                };
                if is_one {
                    self.buckets[self.bucket_in].one.average(hightime, lowtime);
                    self.collect_bit(true, fe);
                } else if is_zero {
                    self.buckets[self.bucket_in].zero.average(hightime, lowtime);
                    self.collect_bit(false, fe);
                } else if st != BucketState::It {
                    self.reset_input(fe);
                }
            }
        }
    }

    /// Opening-pulse classification for a bucket in `Reset`. Also rerun
    /// when a sync burst turns out too short: the terminating pulse may
    /// itself be a valid opening.
    fn sync_open<F: Frontend>(&mut self, fe: &mut F) {
        let (hightime, lowtime) = (self.hightime, self.lowtime);

        #[cfg(feature = "tcm97001")]
        if hightime < tscale(530)
            && hightime > tscale(420)
            && lowtime < tscale(9000)
            && lowtime > tscale(8500)
        {
            let b = &mut self.buckets[self.bucket_in];
            b.sync = 0;
            b.state = BucketState::Tcm97001;
            b.rewind();
            fe.arm_timeout(4600);
            return;
        }

        #[cfg(feature = "it")]
        if hightime < tscale(600)
            && hightime > tscale(140)
            && lowtime < tscale(17000)
            && lowtime > tscale(2500)
        {
            let b = &mut self.buckets[self.bucket_in];
            b.sync = 0;
            b.state = BucketState::It;
            b.rewind();
            fe.arm_timeout(SILENCE);
            return;
        }

        if hightime > tscale(1600) || lowtime > tscale(1600) {
            return;
        }

        let b = &mut self.buckets[self.bucket_in];
        b.zero = Wave::new(hightime, lowtime);
        b.sync = 1;
        b.state = BucketState::Sync;
    }

    /// Sync burst in progress: count matching zero cells, smooth the
    /// template, and on the first non-matching pulse decide where the
    /// frame body goes.
    fn sync_progress<F: Frontend>(&mut self, fe: &mut F) {
        let (hightime, lowtime) = (self.hightime, self.lowtime);
        let bi = self.bucket_in;

        if self.buckets[bi].zero.matches(hightime, lowtime, TDIFF) {
            let b = &mut self.buckets[bi];
            b.zero.average(hightime, lowtime);
            b.sync = b.sync.wrapping_add(1);
            return;
        }

        if self.buckets[bi].sync < 4 {
            // spurious burst; the new pulse may open a fresh frame
            self.buckets[bi].state = BucketState::Reset;
            self.sync_open(fe);
            return;
        }

        // this pulse is the one cell terminating the zero run
        let zero = self.buckets[bi].zero;
        let sync = self.buckets[bi].sync;
        let total = zero.hightime as u32 + zero.lowtime as u32;
        let mut timeout = SILENCE;

        let next = if sync >= 12 && total > tscale(1600) as u32 {
            BucketState::Hms
        } else if cfg!(feature = "esa") && sync >= 10 && total < tscale(600) as u32 {
            timeout = 1000;
            BucketState::Esa
        } else if check_rf_sync(hightime, lowtime)
            && check_rf_sync(zero.lowtime, zero.hightime)
            && fe.rf_router_sync()
        {
            self.reset_input(fe);
            return;
        } else {
            BucketState::Collect
        };

        let b = &mut self.buckets[bi];
        b.state = next;
        b.one = Wave::new(hightime, lowtime);
        b.rewind();
        fe.arm_timeout(timeout);
    }

    /// Append a demodulated bit to the current bucket; a full buffer kills
    /// the frame.
    fn collect_bit<F: Frontend>(&mut self, bit: bool, fe: &mut F) {
        if !self.buckets[self.bucket_in].addbit(bit) {
            self.reset_input(fe);
        }
    }
}
