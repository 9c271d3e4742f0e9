pub mod addr;
mod bin;
pub mod cache;

#[cfg(feature = "stat")]
pub mod stat;

pub use addr::{decompose, Addr, AddrFields};
pub use cache::{
    CacheLine, DirectMappedCache, Dump, DumpEntry, EvictionNotice, MissReason, ReadOutcome,
    WriteOutcome,
};
