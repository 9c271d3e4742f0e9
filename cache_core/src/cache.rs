//! Direct-mapped cache of 16 one-word lines.
//!
//! Every address selects exactly one line through its set index. Reads
//! only classify; writes are the only operation that installs or evicts a
//! line. There is no backing store, so a read hit returns whatever the
//! last write to that line left behind.

use std::{fmt, iter::FusedIterator};

#[cfg(feature = "stat")]
use std::cell::RefCell;

use serde::Serialize;

use crate::addr::{decompose, Addr, AddrFields, LINE_BYTES, NUM_LINES};

#[cfg(feature = "stat")]
use crate::stat::{AddStats, Stats};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u32,
    pub data: [u8; LINE_BYTES],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    /// the line at the set index holds nothing yet.
    NoValidLine,
    /// the line is occupied by another block.
    TagMismatch,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::NoValidLine => write!(f, "no valid line"),
            MissReason::TagMismatch => write!(f, "tag mismatch"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReadOutcome {
    Hit { byte: u8 },
    Miss { reason: MissReason },
}

impl ReadOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, ReadOutcome::Hit { .. })
    }
}

/// Prior contents of a line replaced by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvictionNotice {
    pub set_index: u8,
    pub tag: u32,
    pub valid: bool,
    pub data: [u8; LINE_BYTES],
}

impl fmt::Display for EvictionNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "set: {} - tag: {:#x} - valid: {} - value: {}",
            self.set_index,
            self.tag,
            self.valid as u8,
            HexBytes(&self.data)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub evicted: Option<EvictionNotice>,
    pub set_index: u8,
    pub tag: u32,
    pub data: [u8; LINE_BYTES],
}

impl WriteOutcome {
    /// `true` if the evicted block is the one just written again.
    pub fn evicted_same_tag(&self) -> bool {
        matches!(self.evicted, Some(e) if e.tag == self.tag)
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "set: {} - tag: {:#x} - valid: 1 - value: {}",
            self.set_index,
            self.tag,
            HexBytes(&self.data)
        )
    }
}

/// A valid line as reported by [`DirectMappedCache::dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DumpEntry {
    pub set_index: u8,
    pub tag: u32,
    pub data: [u8; LINE_BYTES],
}

impl fmt::Display for DumpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "set: {} - tag: {:#x} - valid: 1 - value: {}",
            self.set_index,
            self.tag,
            HexBytes(&self.data)
        )
    }
}

/// `data[0] data[1] data[2] data[3]` as two-digit hex.
pub struct HexBytes<'a>(pub &'a [u8; LINE_BYTES]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [b0, b1, b2, b3] = self.0;
        write!(f, "{b0:02x} {b1:02x} {b2:02x} {b3:02x}")
    }
}

/// Iterator over the valid lines, ascending by set index.
#[derive(Clone)]
pub struct Dump<'a> {
    lines: &'a [CacheLine; NUM_LINES],
    next: usize,
}

impl Iterator for Dump<'_> {
    type Item = DumpEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < NUM_LINES {
            let set_index = self.next;
            self.next += 1;
            let line = &self.lines[set_index];
            if line.valid {
                return Some(DumpEntry {
                    set_index: set_index as u8,
                    tag: line.tag,
                    data: line.data,
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(NUM_LINES - self.next))
    }
}

impl FusedIterator for Dump<'_> {}

pub struct DirectMappedCache {
    lines: [CacheLine; NUM_LINES],
    #[cfg(feature = "stat")]
    stat: RefCell<stat::CacheStat>,
}

impl DirectMappedCache {
    pub fn new() -> Self {
        Self {
            lines: [CacheLine::default(); NUM_LINES],
            #[cfg(feature = "stat")]
            stat: RefCell::default(),
        }
    }

    pub fn line(&self, set_index: u8) -> Option<&CacheLine> {
        self.lines.get(set_index as usize)
    }

    pub fn read(&self, address: u32) -> ReadOutcome {
        let fields = decompose(address);
        log::trace!("read {}: {fields:?}", Addr::new(address));
        let line = &self.lines[fields.line()];
        let outcome = if !line.valid {
            ReadOutcome::Miss {
                reason: MissReason::NoValidLine,
            }
        } else if line.tag == fields.tag {
            ReadOutcome::Hit {
                byte: line.data[fields.offset as usize],
            }
        } else {
            ReadOutcome::Miss {
                reason: MissReason::TagMismatch,
            }
        };
        log::debug!(
            "read {} (set: {}, tag: {:#x}) -> {outcome:?}",
            Addr::new(address),
            fields.set_index,
            fields.tag
        );
        #[cfg(feature = "stat")]
        self.stat.borrow_mut().on_read(&outcome);
        outcome
    }

    /// Installs the whole word at the address's line.
    ///
    /// A previously valid line is always reported as evicted, including
    /// when its tag equals the incoming one.
    pub fn write(&mut self, address: u32, value: u32) -> WriteOutcome {
        let AddrFields { tag, set_index, .. } = decompose(address);
        log::trace!("write {} <- {value:#010x}", Addr::new(address));
        let line = &mut self.lines[set_index as usize];
        let evicted = line.valid.then(|| EvictionNotice {
            set_index,
            tag: line.tag,
            valid: line.valid,
            data: line.data,
        });
        if let Some(e) = &evicted {
            log::debug!("evicting block - {e}");
        }
        *line = CacheLine {
            valid: true,
            tag,
            data: value.to_le_bytes(),
        };
        let outcome = WriteOutcome {
            evicted,
            set_index,
            tag,
            data: line.data,
        };
        #[cfg(feature = "stat")]
        self.stat.get_mut().on_write(&outcome);
        outcome
    }

    pub fn dump(&self) -> Dump<'_> {
        Dump {
            lines: &self.lines,
            next: 0,
        }
    }

    #[cfg(feature = "stat")]
    pub fn collect_stat(&self) -> Stats {
        let mut ss = Stats::default();
        self.add_stats(&mut ss);
        ss
    }
}

impl Default for DirectMappedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "stat")]
impl AddStats for DirectMappedCache {
    fn add_stats(&self, buf: &mut Stats) {
        buf.push(Box::new(*self.stat.borrow()));
    }
}

#[cfg(feature = "stat")]
pub mod stat {
    use std::fmt;

    use super::{MissReason, ReadOutcome, WriteOutcome};
    use crate::stat::*;

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct CacheStat {
        pub reads: usize,
        pub hits: usize,
        pub miss_no_valid_line: usize,
        pub miss_tag_mismatch: usize,
        pub writes: usize,
        pub evictions: usize,
        pub same_tag_evictions: usize,
    }

    impl CacheStat {
        pub fn on_read(&mut self, outcome: &ReadOutcome) {
            self.reads += 1;
            match outcome {
                ReadOutcome::Hit { .. } => self.hits += 1,
                ReadOutcome::Miss {
                    reason: MissReason::NoValidLine,
                } => self.miss_no_valid_line += 1,
                ReadOutcome::Miss {
                    reason: MissReason::TagMismatch,
                } => self.miss_tag_mismatch += 1,
            }
        }
        pub fn on_write(&mut self, outcome: &WriteOutcome) {
            self.writes += 1;
            if outcome.evicted.is_some() {
                self.evictions += 1;
            }
            if outcome.evicted_same_tag() {
                self.same_tag_evictions += 1;
            }
        }
        /// hits per read in percent, `None` before the first read.
        pub fn hit_rate(&self) -> Option<f64> {
            (self.reads != 0).then(|| self.hits as f64 * 100.0 / self.reads as f64)
        }
    }

    impl Stat for CacheStat {
        fn view(&self, _: usize) -> Box<dyn StatView + '_> {
            Box::new(CacheStatView { stat: self })
        }
    }

    pub struct CacheStatView<'a> {
        stat: &'a CacheStat,
    }

    impl StatView for CacheStatView<'_> {
        fn header(&self) -> &'static str {
            "cache accesses"
        }
        /// widest rendered row; rows grow with the counters.
        fn width(&self) -> usize {
            self.to_string().lines().map(str::len).max().unwrap_or(0)
        }
    }

    impl fmt::Display for CacheStatView<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let s = self.stat;
            let rate = match s.hit_rate() {
                Some(r) => format!("{r:.2}%"),
                None => "-".to_owned(),
            };
            writeln!(f, "  {:>18}:{:>11}", "reads", s.reads)?;
            writeln!(f, "  {:>18}:{:>11} ({rate})", "hits", s.hits)?;
            writeln!(f, "  {:>18}:{:>11}", "miss (no line)", s.miss_no_valid_line)?;
            writeln!(f, "  {:>18}:{:>11}", "miss (tag)", s.miss_tag_mismatch)?;
            writeln!(f, "  {:>18}:{:>11}", "writes", s.writes)?;
            write!(
                f,
                "  {:>18}:{:>11} (same tag: {})",
                "evictions", s.evictions, s.same_tag_evictions
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u32, set_index: u32, offset: u32) -> u32 {
        tag << 6 | set_index << 2 | offset
    }

    #[test]
    fn test_cold_cache_misses() {
        let c = DirectMappedCache::new();
        for a in [0x0000_0000, 0x0000_0004, 0x1234_5678, 0xFFFF_FFFF] {
            assert_eq!(
                ReadOutcome::Miss {
                    reason: MissReason::NoValidLine
                },
                c.read(a)
            );
        }
        assert_eq!(0, c.dump().count());
    }
    #[test]
    fn test_write_then_read_every_offset() {
        let mut c = DirectMappedCache::new();
        let base = addr(0x2A, 5, 0);
        let v = 0x1122_3344u32;
        c.write(base + 2, v);
        for (offset, byte) in v.to_le_bytes().into_iter().enumerate() {
            assert_eq!(ReadOutcome::Hit { byte }, c.read(base + offset as u32));
        }
    }
    #[test]
    fn test_byte_order() {
        let mut c = DirectMappedCache::new();
        let w = c.write(0x0000_0000, 0xAABB_CCDD);
        assert_eq!([0xDD, 0xCC, 0xBB, 0xAA], w.data);
        assert_eq!(ReadOutcome::Hit { byte: 0xDD }, c.read(0x0000_0000));
        assert_eq!(ReadOutcome::Hit { byte: 0xCC }, c.read(0x0000_0001));
    }
    #[test]
    fn test_conflict_evicts() {
        let mut c = DirectMappedCache::new();
        let a1 = addr(1, 9, 0);
        let a2 = addr(2, 9, 0);
        let first = c.write(a1, 0xDEAD_BEEF);
        assert_eq!(None, first.evicted);
        let second = c.write(a2, 0x0102_0304);
        assert_eq!(
            Some(EvictionNotice {
                set_index: 9,
                tag: 1,
                valid: true,
                data: 0xDEAD_BEEFu32.to_le_bytes(),
            }),
            second.evicted
        );
        assert!(!second.evicted_same_tag());
        assert_eq!(
            ReadOutcome::Miss {
                reason: MissReason::TagMismatch
            },
            c.read(a1)
        );
        assert_eq!(ReadOutcome::Hit { byte: 0x04 }, c.read(a2));
    }
    #[test]
    fn test_read_does_not_mutate() {
        let mut c = DirectMappedCache::new();
        let a = addr(7, 3, 1);
        c.write(a, 0xCAFE_F00D);
        let before = *c.line(3).unwrap();
        assert!(!c.read(addr(8, 3, 1)).is_hit());
        assert_eq!(before, *c.line(3).unwrap());
        assert!(c.read(a).is_hit());
    }
    #[test]
    fn test_same_tag_rewrite_reports_eviction() {
        let mut c = DirectMappedCache::new();
        let a = addr(0x3FF_FFFF, 15, 3);
        let first = c.write(a, 0x5555_AAAA);
        let line = *c.line(15).unwrap();
        let second = c.write(a, 0x5555_AAAA);
        assert_eq!(
            Some(EvictionNotice {
                set_index: 15,
                tag: line.tag,
                valid: true,
                data: line.data,
            }),
            second.evicted
        );
        assert!(second.evicted_same_tag());
        assert_eq!(line, *c.line(15).unwrap());
        assert_eq!(first.data, second.data);
    }
    #[test]
    fn test_dump_ascending_and_latest() {
        let mut c = DirectMappedCache::new();
        c.write(addr(4, 12, 0), 0x0C0C_0C0C);
        c.write(addr(1, 7, 0), 0x0707_0707);
        c.write(addr(3, 3, 0), 0x0303_0303);
        let w = c.write(addr(2, 7, 0), 0x7777_7777);
        assert!(w.evicted.is_some());
        let entries: Vec<_> = c.dump().collect();
        assert_eq!(
            vec![
                DumpEntry {
                    set_index: 3,
                    tag: 3,
                    data: [0x03; 4]
                },
                DumpEntry {
                    set_index: 7,
                    tag: 2,
                    data: [0x77; 4]
                },
                DumpEntry {
                    set_index: 12,
                    tag: 4,
                    data: [0x0C; 4]
                },
            ],
            entries
        );
    }
    #[test]
    fn test_dump_restartable() {
        let mut c = DirectMappedCache::new();
        c.write(addr(1, 0, 0), 1);
        c.write(addr(1, 15, 0), 2);
        let mut d = c.dump();
        assert_eq!(Some(0), d.next().map(|e| e.set_index));
        let rest = d.clone();
        assert_eq!(Some(15), d.next().map(|e| e.set_index));
        assert_eq!(None, d.next());
        assert_eq!(None, d.next());
        assert_eq!(1, rest.count());
        assert_eq!(2, c.dump().count());
    }
    #[test]
    fn test_independent_instances() {
        let mut a = DirectMappedCache::new();
        let b = DirectMappedCache::default();
        a.write(0x40, 1);
        assert!(a.read(0x40).is_hit());
        assert!(!b.read(0x40).is_hit());
    }
    #[test]
    fn test_display() {
        let mut c = DirectMappedCache::new();
        c.write(0x0000_0044, 0xAABB_CCDD);
        let w = c.write(0x0000_0084, 0x0000_0001);
        assert_eq!(
            "set: 1 - tag: 0x1 - valid: 1 - value: dd cc bb aa",
            format!("{}", w.evicted.unwrap())
        );
        assert_eq!("set: 1 - tag: 0x2 - valid: 1 - value: 01 00 00 00", format!("{w}"));
        let e = c.dump().next().unwrap();
        assert_eq!(format!("{w}"), format!("{e}"));
    }
    #[cfg(feature = "stat")]
    #[test]
    fn test_stat_counts() {
        let mut c = DirectMappedCache::new();
        c.read(0x0);
        c.write(0x0, 1);
        c.read(0x0);
        c.read(0x40);
        c.write(0x0, 1);
        c.write(0x40, 2);
        let s = *c.stat.borrow();
        assert_eq!(
            stat::CacheStat {
                reads: 3,
                hits: 1,
                miss_no_valid_line: 1,
                miss_tag_mismatch: 1,
                writes: 3,
                evictions: 2,
                same_tag_evictions: 1,
            },
            s
        );
        let rate = s.hit_rate().unwrap();
        assert!((rate - 100.0 / 3.0).abs() < 1e-9);
        let view = format!("{}", c.collect_stat().view(80));
        assert!(view.contains("cache accesses:"));
        assert!(view.contains("(33.33%)"));
        assert!(view.contains("(same tag: 1)"));
    }
    #[cfg(feature = "stat")]
    #[test]
    fn test_stat_frame_fits_rows() {
        let mut c = DirectMappedCache::new();
        c.write(0x0, 1);
        c.read(0x0);
        c.read(0x40);
        for _ in 0..1000 {
            c.write(0x0, 1);
        }
        let view = format!("{}", c.collect_stat().view(80));
        let lines: Vec<_> = view.lines().collect();
        let frame = lines.last().unwrap().len();
        assert_eq!(frame, lines[0].len());
        for l in &lines {
            assert!(l.len() <= frame, "row wider than frame ({frame}): {l:?}");
        }
        assert!(view.contains("(50.00%)"));
        assert!(view.contains("(same tag: 1000)"));
    }
    #[cfg(feature = "stat")]
    #[test]
    fn test_stat_hit_rate_before_reads() {
        let c = DirectMappedCache::new();
        assert_eq!(None, c.stat.borrow().hit_rate());
        assert!(format!("{}", c.collect_stat().view(80)).contains("(-)"));
    }
}
