//! Ready-made step sinks.
//!
//! Every sink here is a pure consumer: nothing it does feeds back into
//! the engine. Sinks that perform I/O latch their first error and report
//! it when asked, instead of interrupting the drive loop.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};

use topple_core::{Cell, Frame, StepId, StepSink, StepStats};
use tracing::warn;

// ── DataLog ─────────────────────────────────────────────────────

/// Run parameters written at the top of a fresh data log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataHeader {
    /// Grid rows.
    pub rows: u32,
    /// Grid columns.
    pub cols: u32,
    /// Per-cell forcing probability.
    pub probability: f64,
    /// Whether forcing ignores activity.
    pub running: bool,
    /// RNG seed.
    pub seed: u64,
}

impl fmt::Display for DataHeader {
    /// Three lines: parameters, column names, a rule of 56 `=`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} rows, {} cols, p={}, running={}, seed={}",
            self.rows, self.cols, self.probability, self.running, self.seed
        )?;
        writeln!(f, "critical cells; added grains; lost grains; total grains;")?;
        writeln!(f, "{}", "=".repeat(56))
    }
}

/// Append-only per-step log: one `critical;added;lost;total;` line per
/// step.
///
/// # Examples
///
/// ```
/// use topple_core::{StepId, StepSink, StepStats};
/// use topple_engine::DataLog;
///
/// let mut log = DataLog::new(Vec::new());
/// log.on_step(StepId(1), &StepStats { critical: 2, added: 1, lost: 0i64, total: 40 });
/// let bytes = log.finish().unwrap();
/// assert_eq!(String::from_utf8(bytes).unwrap(), "2;1;0;40;\n");
/// ```
#[derive(Debug)]
pub struct DataLog<W: Write> {
    out: W,
    error: Option<io::Error>,
    lines: u64,
}

impl<W: Write> DataLog<W> {
    /// Wrap a writer. Nothing is written yet.
    pub fn new(out: W) -> Self {
        Self {
            out,
            error: None,
            lines: 0,
        }
    }

    /// Write the three-line run header.
    pub fn write_header(&mut self, header: &DataHeader) -> io::Result<()> {
        write!(self.out, "{header}")
    }

    /// Step lines written so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush, then report (and clear) the first latched write error.
    pub fn check(&mut self) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()
    }

    /// Flush and return the writer, or the first latched write error.
    pub fn finish(mut self) -> io::Result<W> {
        self.check()?;
        Ok(self.out)
    }
}

impl<T: Cell, W: Write> StepSink<T> for DataLog<W> {
    fn on_step(&mut self, step: StepId, stats: &StepStats<T>) {
        if self.error.is_some() {
            return;
        }
        match writeln!(self.out, "{}", stats.log_line()) {
            Ok(()) => self.lines += 1,
            Err(e) => {
                warn!(step = step.0, error = %e, "data log write failed; further lines dropped");
                self.error = Some(e);
            }
        }
    }
}

// ── StatsWindow ─────────────────────────────────────────────────

/// Bounded buffers of recent critical counts and totals, as a live plot
/// would keep them.
#[derive(Clone, Debug)]
pub struct StatsWindow {
    criticals: VecDeque<u64>,
    totals: VecDeque<f64>,
    critical_cap: usize,
    total_cap: usize,
}

impl Default for StatsWindow {
    /// 600 critical counts, 10 000 totals.
    fn default() -> Self {
        Self::with_capacity(600, 10_000)
    }
}

impl StatsWindow {
    /// Buffers holding at most `critical_cap` and `total_cap` samples.
    pub fn with_capacity(critical_cap: usize, total_cap: usize) -> Self {
        Self {
            criticals: VecDeque::with_capacity(critical_cap),
            totals: VecDeque::with_capacity(total_cap),
            critical_cap,
            total_cap,
        }
    }

    /// Recent critical counts, oldest first.
    pub fn criticals(&self) -> &VecDeque<u64> {
        &self.criticals
    }

    /// Recent totals, oldest first.
    pub fn totals(&self) -> &VecDeque<f64> {
        &self.totals
    }
}

fn push_bounded<V>(buf: &mut VecDeque<V>, cap: usize, v: V) {
    if cap == 0 {
        return;
    }
    if buf.len() == cap {
        buf.pop_front();
    }
    buf.push_back(v);
}

impl<T: Cell> StepSink<T> for StatsWindow {
    fn on_step(&mut self, _step: StepId, stats: &StepStats<T>) {
        push_bounded(&mut self.criticals, self.critical_cap, stats.critical);
        push_bounded(&mut self.totals, self.total_cap, stats.total.to_f64());
    }
}

// ── FrameRecorder ───────────────────────────────────────────────

/// An owned copy of one grid state.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedFrame<T> {
    /// The step that produced it.
    pub step: StepId,
    /// Row-major cell values.
    pub cells: Vec<T>,
}

/// Captures a snapshot of the grid after every step, for animation.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder<T> {
    frames: Vec<RecordedFrame<T>>,
    rows: u32,
    cols: u32,
    limit: Option<usize>,
}

impl<T: Cell> FrameRecorder<T> {
    /// Record every frame.
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            rows: 0,
            cols: 0,
            limit: None,
        }
    }

    /// Record at most `limit` frames, then stop asking for more.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Frames recorded so far.
    pub fn frames(&self) -> &[RecordedFrame<T>] {
        &self.frames
    }

    /// Borrow a recorded frame as a [`Frame`].
    pub fn frame(&self, index: usize) -> Option<Frame<'_, T>> {
        self.frames.get(index).map(|f| Frame {
            step: f.step,
            rows: self.rows,
            cols: self.cols,
            cells: &f.cells,
        })
    }

    /// Drop all recorded frames.
    pub fn reset(&mut self) {
        self.frames.clear();
    }
}

impl<T: Cell> StepSink<T> for FrameRecorder<T> {
    fn on_step(&mut self, _step: StepId, _stats: &StepStats<T>) {}

    fn wants_frames(&self) -> bool {
        self.limit.is_none_or(|limit| self.frames.len() < limit)
    }

    fn on_frame(&mut self, frame: Frame<'_, T>) {
        self.rows = frame.rows;
        self.cols = frame.cols;
        self.frames.push(RecordedFrame {
            step: frame.step,
            cells: frame.cells.to_vec(),
        });
    }
}

// ── Fanout ──────────────────────────────────────────────────────

/// Forwards every callback to several sinks, in insertion order.
///
/// Frames are built once and handed to every sink that wants them.
pub struct Fanout<'s, T> {
    sinks: Vec<Box<dyn StepSink<T> + 's>>,
}

impl<T> fmt::Debug for Fanout<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fanout")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl<T> Default for Fanout<'_, T> {
    fn default() -> Self {
        Self { sinks: Vec::new() }
    }
}

impl<'s, T> Fanout<'s, T> {
    /// An empty fanout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink. Borrowed sinks (`&mut S`) work as well as owned ones.
    pub fn with(mut self, sink: impl StepSink<T> + 's) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Number of attached sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// `true` with no sinks attached.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl<T> StepSink<T> for Fanout<'_, T> {
    fn on_step(&mut self, step: StepId, stats: &StepStats<T>) {
        for sink in &mut self.sinks {
            sink.on_step(step, stats);
        }
    }

    fn wants_frames(&self) -> bool {
        self.sinks.iter().any(|s| s.wants_frames())
    }

    fn on_frame(&mut self, frame: Frame<'_, T>) {
        for sink in &mut self.sinks {
            if sink.wants_frames() {
                sink.on_frame(frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(critical: u64, total: i64) -> StepStats<i64> {
        StepStats {
            critical,
            added: 0,
            lost: 0,
            total,
        }
    }

    #[test]
    fn header_has_three_lines() {
        let h = DataHeader {
            rows: 3,
            cols: 4,
            probability: 0.5,
            running: false,
            seed: 9,
        };
        let text = h.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "3 rows, 4 cols, p=0.5, running=false, seed=9");
        assert_eq!(
            lines[1],
            "critical cells; added grains; lost grains; total grains;"
        );
        assert_eq!(lines[2].len(), 56);
        assert!(lines[2].chars().all(|c| c == '='));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn data_log_appends_lines_after_header() {
        let mut log = DataLog::new(Vec::new());
        log.write_header(&DataHeader {
            rows: 1,
            cols: 1,
            probability: 1.0,
            running: true,
            seed: 0,
        })
        .unwrap();
        log.on_step(StepId(1), &stats(1, 5));
        log.on_step(StepId(2), &stats(0, 5));
        assert_eq!(log.lines(), 2);
        let text = String::from_utf8(log.finish().unwrap()).unwrap();
        assert!(text.ends_with("=\n1;0;0;5;\n0;0;0;5;\n"));
    }

    #[test]
    fn data_log_latches_write_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mut log = DataLog::new(Broken);
        log.on_step(StepId(1), &stats(0, 0));
        log.on_step(StepId(2), &stats(0, 0));
        assert_eq!(log.lines(), 0);
        let err = log.check().unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        // Reported once.
        assert!(log.check().is_ok());
    }

    #[test]
    fn stats_window_is_bounded() {
        let mut w = StatsWindow::with_capacity(2, 3);
        for i in 0..5 {
            w.on_step(StepId(i), &stats(i, i as i64 * 10));
        }
        assert_eq!(w.criticals().iter().copied().collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(
            w.totals().iter().copied().collect::<Vec<_>>(),
            vec![20.0, 30.0, 40.0]
        );
    }

    #[test]
    fn frame_recorder_respects_limit() {
        let mut rec = FrameRecorder::<i64>::with_limit(2);
        let cells = [1i64, 2, 3, 4];
        for i in 0..3 {
            if rec.wants_frames() {
                rec.on_frame(Frame {
                    step: StepId(i),
                    rows: 2,
                    cols: 2,
                    cells: &cells,
                });
            }
        }
        assert_eq!(rec.frames().len(), 2);
        assert!(!rec.wants_frames());
        assert_eq!(rec.frame(1).and_then(|f| f.get(1, 0)), Some(3));
        rec.reset();
        assert!(rec.wants_frames());
    }

    #[test]
    fn fanout_forwards_to_all() {
        let mut window = StatsWindow::default();
        let mut rec = FrameRecorder::<i64>::new();
        {
            let mut fan = Fanout::new().with(&mut window).with(&mut rec).with(());
            assert_eq!(fan.len(), 3);
            assert!(fan.wants_frames());
            fan.on_step(StepId(1), &stats(2, 7));
            fan.on_frame(Frame {
                step: StepId(1),
                rows: 1,
                cols: 1,
                cells: &[7],
            });
        }
        assert_eq!(window.criticals().len(), 1);
        assert_eq!(rec.frames().len(), 1);
    }

    #[test]
    fn fanout_hands_each_frame_to_every_recorder() {
        let shape = topple_space::Square4::new(2, 2).unwrap();
        let mut pile = crate::Sandpile::builder(topple_rules::Abelian::default())
            .probability(0.2)
            .seed(5)
            .build_random(shape)
            .unwrap();
        let mut first = FrameRecorder::<i64>::new();
        let mut second = FrameRecorder::<i64>::with_limit(2);
        pile.drive(3, Fanout::new().with(&mut first).with(&mut second));

        assert_eq!(first.frames().len(), 3);
        assert_eq!(second.frames().len(), 2);
        assert_eq!(first.frames()[..2], second.frames()[..]);
        assert_eq!(first.frames()[2].cells, pile.grid().as_slice());
    }
}
