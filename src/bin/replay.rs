//! # Pulse trace replay
//!
//! Feeds a recorded pulse trace from stdin through the decoder and prints
//! the emitted lines on stdout. Useful to rerun captures from a live
//! receiver in monitor mode on the bench.
//!
//! Trace format, one event per line:
//!  - `<high> <low>`  pulse pair, scaled units of 16 µs
//!  - `.`             silence, closes the current frame
//!  - `# ...`         comment
//!
//! The first argument, when present, is the report byte in hex
//! (default 01, decoded frames only; try 05 for the bit dumps).

use std::io::{self, BufRead, Write};

use slowrf::{Console, Frontend, Pulse, Receiver};

/// Tick advance per silence event: one end-of-frame gap is well below the
/// 0.3 s repeat window, so replayed doublets still deduplicate.
const TICKS_PER_SILENCE: u32 = 2;

#[derive(Default)]
struct HostFrontend {
    ticks: u32,
    counter: u32,
}

impl Frontend for HostFrontend {
    fn ticks(&self) -> u32 {
        self.ticks
    }
    fn rssi(&mut self) -> u8 {
        0
    }
    fn restart_counter(&mut self) {
        self.counter = 0;
    }
    fn arm_timeout(&mut self, _ticks: u16) {}
    fn clear_timeout(&mut self) {}
}

struct StdoutConsole(io::Stdout);

impl Console for StdoutConsole {
    fn putc(&mut self, c: u8) {
        let _ = self.0.write_all(&[c]);
    }
}

fn main() {
    let report = std::env::args()
        .nth(1)
        .map(|a| u8::from_str_radix(&a, 16).unwrap_or_else(|_| die(&a)))
        .unwrap_or(0x01);

    let mut rx = Receiver::new();
    rx.set_report(report.into());
    let mut fe = HostFrontend::default();
    let mut out = StdoutConsole(io::stdout());

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "." {
            rx.rf_silence(&mut fe, &mut out);
            fe.ticks += TICKS_PER_SILENCE;
            rx.rf_analyze(&mut fe, &mut out);
            continue;
        }
        let mut fields = line.split_whitespace();
        let (high, low) = match (fields.next(), fields.next()) {
            (Some(h), Some(l)) => (parse(h), parse(l)),
            _ => die(line),
        };
        fe.counter += high as u32;
        rx.rf_edge(false, fe.counter as Pulse, &mut fe);
        fe.counter += low as u32;
        rx.rf_edge(true, fe.counter as Pulse, &mut fe);
        rx.rf_analyze(&mut fe, &mut out);
    }

    // drain whatever the trace left behind
    rx.rf_silence(&mut fe, &mut out);
    while rx.pending() > 0 {
        rx.rf_analyze(&mut fe, &mut out);
    }
}

fn parse(s: &str) -> Pulse {
    s.parse().unwrap_or_else(|_| die(s))
}

fn die(what: &str) -> ! {
    eprintln!("replay: cannot parse {what:?}");
    eprintln!("usage: replay [report-hex] < trace");
    std::process::exit(1);
}
