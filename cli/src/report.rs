//! Console rendering of cache outcomes.

use std::io::{self, Write};

use cache_core::{
    addr::{decompose, Addr},
    cache::HexBytes,
    DirectMappedCache, Dump, MissReason, ReadOutcome, WriteOutcome,
};
use serde_json::json;

#[cfg(feature = "stat")]
use terminal_size::terminal_size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Format {
    #[default]
    Text,
    /// one JSON object per line
    Json,
}

pub(crate) struct Reporter<W> {
    out: W,
    format: Format,
}

impl<W: Write> Reporter<W> {
    pub(crate) fn new(out: W, format: Format) -> Self {
        Self { out, format }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    /// `cache` supplies the resident byte printed on a tag mismatch.
    pub(crate) fn read(
        &mut self,
        cache: &DirectMappedCache,
        address: u32,
        outcome: &ReadOutcome,
    ) -> io::Result<()> {
        let fields = decompose(address);
        match self.format {
            Format::Json => writeln!(
                self.out,
                "{}",
                json!({
                    "op": "read",
                    "address": Addr::new(address),
                    "fields": fields,
                    "result": outcome,
                })
            ),
            Format::Text => {
                writeln!(
                    self.out,
                    "looking for set: {} - tag: {:#x}",
                    fields.set_index, fields.tag
                )?;
                match outcome {
                    ReadOutcome::Hit { byte } => writeln!(
                        self.out,
                        "hit! set: {} - tag: {:#x} - offset: {} - value: {byte:02x}",
                        fields.set_index, fields.tag, fields.offset
                    ),
                    ReadOutcome::Miss {
                        reason: MissReason::NoValidLine,
                    } => writeln!(self.out, "no valid set found - miss!"),
                    ReadOutcome::Miss {
                        reason: MissReason::TagMismatch,
                    } => {
                        if let Some(line) = cache.line(fields.set_index) {
                            writeln!(
                                self.out,
                                "found set: {} - tag: {:#x} - offset: {} - valid: {} - value: {:02x}",
                                fields.set_index,
                                line.tag,
                                fields.offset,
                                line.valid as u8,
                                line.data[fields.offset as usize]
                            )?;
                        }
                        writeln!(self.out, "tags don't match - miss!")
                    }
                }
            }
        }
    }

    pub(crate) fn write(
        &mut self,
        address: u32,
        value: u32,
        outcome: &WriteOutcome,
    ) -> io::Result<()> {
        match self.format {
            Format::Json => writeln!(
                self.out,
                "{}",
                json!({
                    "op": "write",
                    "address": Addr::new(address),
                    "value": value,
                    "result": outcome,
                })
            ),
            Format::Text => {
                if let Some(e) = &outcome.evicted {
                    writeln!(self.out, "evicting block - {e}")?;
                }
                writeln!(self.out, "wrote {outcome}")
            }
        }
    }

    pub(crate) fn dump(&mut self, lines: Dump<'_>) -> io::Result<()> {
        match self.format {
            Format::Json => {
                let lines: Vec<_> = lines.collect();
                writeln!(self.out, "{}", json!({ "op": "dump", "lines": lines }))
            }
            Format::Text => {
                let mut empty = true;
                for e in lines {
                    empty = false;
                    writeln!(self.out, "{e}")?;
                }
                if empty {
                    writeln!(self.out, "cache is empty.")?;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn message(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{msg}")
    }

    #[cfg(feature = "stat")]
    pub(crate) fn stat(&mut self, cache: &DirectMappedCache) -> io::Result<()> {
        writeln!(self.out, "{}", cache.collect_stat().view(stat_width()))
    }

    #[cfg(not(feature = "stat"))]
    pub(crate) fn stat(&mut self, _: &DirectMappedCache) -> io::Result<()> {
        writeln!(self.out, "statistics unavailable; rebuild with `--features stat`.")
    }

    /// the line at `address`'s set, whatever its state.
    pub(crate) fn line_of(&mut self, cache: &DirectMappedCache, address: u32) -> io::Result<()> {
        let fields = decompose(address);
        match cache.line(fields.set_index) {
            Some(line) => writeln!(
                self.out,
                "set: {} - tag: {:#x} - valid: {} - value: {}",
                fields.set_index,
                line.tag,
                line.valid as u8,
                HexBytes(&line.data)
            ),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "stat")]
fn get_terminal_width() -> Option<u16> {
    terminal_size().map(|(w, _)| w.0.saturating_sub(20))
}

/// width available to the statistics table.
#[cfg(feature = "stat")]
pub(crate) fn stat_width() -> usize {
    get_terminal_width().unwrap_or(120) as usize
}
