use std::io::{self, Write};

use cache_core::DirectMappedCache;

use crate::{
    command::{Command, HELP},
    report::Reporter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// One cache and the reporter its outcomes go to.
pub(crate) struct Session<W> {
    cache: DirectMappedCache,
    reporter: Reporter<W>,
}

impl<W: Write> Session<W> {
    pub(crate) fn new(reporter: Reporter<W>) -> Self {
        Self {
            cache: DirectMappedCache::new(),
            reporter,
        }
    }

    pub(crate) fn cache(&self) -> &DirectMappedCache {
        &self.cache
    }

    #[cfg(test)]
    pub(crate) fn into_reporter(self) -> Reporter<W> {
        self.reporter
    }

    pub(crate) fn execute(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Read(address) => {
                let outcome = self.cache.read(address);
                self.reporter.read(&self.cache, address, &outcome)?;
            }
            Command::Write { address, value } => {
                let outcome = self.cache.write(address, value);
                self.reporter.write(address, value, &outcome)?;
            }
            Command::Show(address) => self.reporter.line_of(&self.cache, address)?,
            Command::Print => self.reporter.dump(self.cache.dump())?,
            Command::Stat => self.reporter.stat(&self.cache)?,
            Command::Help => self.reporter.message(HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}
