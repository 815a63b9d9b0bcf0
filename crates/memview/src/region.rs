//! Memory regions and the directory mapping addresses to them.
//!
//! A [`Region`] describes one contiguous, permission-tagged window of a
//! target's address space. [`RegionMap`] is the directory the surrounding
//! framework populates from the target's memory-map metadata; a cursor
//! consults it on every access, so the map may change while cursors are live.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ParsePermsError, RegionMapError};

bitflags! {
    /// Access permissions of a memory region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Perms: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const EXEC = 1 << 2;
    }
}

impl Perms {
    /// Shorthand for `READ | WRITE`.
    pub const RW: Perms = Perms::READ.union(Perms::WRITE);
}

/// Formats as the 3-character `rwx` form used in memory-map listings,
/// e.g. `rw-` or `r-x`.
impl fmt::Display for Perms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.contains(Perms::READ) { 'r' } else { '-' },
            if self.contains(Perms::WRITE) { 'w' } else { '-' },
            if self.contains(Perms::EXEC) { 'x' } else { '-' },
        )
    }
}

impl FromStr for Perms {
    type Err = ParsePermsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let mut perms = Perms::empty();
        for (letter, flag) in [
            ('r', Perms::READ),
            ('w', Perms::WRITE),
            ('x', Perms::EXEC),
        ] {
            match chars.next() {
                Some(c) if c == letter => perms |= flag,
                Some('-') => {}
                _ => return Err(ParsePermsError(s.to_string())),
            }
        }
        if chars.next().is_some() {
            return Err(ParsePermsError(s.to_string()));
        }
        Ok(perms)
    }
}

impl Serialize for Perms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Perms {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One contiguous window of a target's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// First address covered by the region.
    pub base: u64,
    /// Extent in bytes. A zero-size region contains no address.
    pub size: u64,
    /// Access permissions granted by the target's memory map.
    pub perms: Perms,
}

impl Region {
    pub fn new(base: u64, size: u64, perms: Perms) -> Self {
        Region { base, size, perms }
    }

    /// Exclusive upper bound, saturating at the top of the address space.
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    /// Whether `addr` satisfies `base <= addr < end()`.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }

    /// Bytes from `addr` up to the region end, 0 when `addr` is outside.
    pub fn remaining_from(&self, addr: u64) -> u64 {
        if self.contains(addr) {
            self.end() - addr
        } else {
            0
        }
    }

    pub fn is_readable(&self) -> bool {
        self.perms.contains(Perms::READ)
    }

    pub fn is_writable(&self) -> bool {
        self.perms.contains(Perms::WRITE)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}..{:#x} {}", self.base, self.end(), self.perms)
    }
}

/// Directory mapping addresses to the regions containing them.
///
/// Keyed by base address. Regions never overlap; insertion enforces it.
#[derive(Debug, Default, Clone)]
pub struct RegionMap {
    regions: BTreeMap<u64, Region>,
}

impl RegionMap {
    pub fn new() -> Self {
        RegionMap::default()
    }

    /// Build a directory from a list of regions, e.g. one deserialized from
    /// a target's memory-map metadata.
    pub fn from_regions(regions: impl IntoIterator<Item = Region>) -> Result<Self, RegionMapError> {
        let mut map = RegionMap::new();
        for region in regions {
            map.insert(region)?;
        }
        Ok(map)
    }

    /// Add a region, rejecting any overlap with an existing one.
    pub fn insert(&mut self, region: Region) -> Result<(), RegionMapError> {
        if let Some((&base, prev)) = self.regions.range(..=region.base).next_back() {
            if base == region.base || prev.end() > region.base {
                return Err(RegionMapError::overlap(&region, prev));
            }
        }
        if let Some((_, next)) = self.regions.range(region.base..region.end()).next() {
            return Err(RegionMapError::overlap(&region, next));
        }
        self.regions.insert(region.base, region);
        Ok(())
    }

    /// Remove the region based at `base`, returning it if present.
    pub fn remove(&mut self, base: u64) -> Option<Region> {
        self.regions.remove(&base)
    }

    /// The region containing `addr`, if any.
    pub fn resolve(&self, addr: u64) -> Option<&Region> {
        self.regions
            .range(..=addr)
            .next_back()
            .map(|(_, region)| region)
            .filter(|region| region.contains(addr))
    }

    /// Exclusive end of the highest mapped region, 0 when the map is empty.
    ///
    /// This is the value end-relative seeks land on.
    pub fn end(&self) -> u64 {
        self.regions.values().next_back().map_or(0, Region::end)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in ascending base order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perms_parse_and_display() {
        let perms: Perms = "rw-".parse().unwrap();
        assert_eq!(perms, Perms::READ | Perms::WRITE);
        assert_eq!(perms.to_string(), "rw-");

        assert_eq!("---".parse::<Perms>().unwrap(), Perms::empty());
        assert_eq!("rwx".parse::<Perms>().unwrap(), Perms::all());
        assert_eq!("r-x".parse::<Perms>().unwrap(), Perms::READ | Perms::EXEC);
    }

    #[test]
    fn test_perms_rejects_malformed() {
        assert!("rw".parse::<Perms>().is_err());
        assert!("rwxx".parse::<Perms>().is_err());
        assert!("wr-".parse::<Perms>().is_err());
        assert!("RW-".parse::<Perms>().is_err());
    }

    #[test]
    fn test_region_membership() {
        let region = Region::new(0x1000, 0x10, Perms::READ);
        assert_eq!(region.end(), 0x1010);
        assert!(region.contains(0x1000));
        assert!(region.contains(0x100f));
        assert!(!region.contains(0x1010));
        assert!(!region.contains(0xfff));

        assert_eq!(region.remaining_from(0x1005), 0xb);
        assert_eq!(region.remaining_from(0x2000), 0);
    }

    #[test]
    fn test_zero_size_region_contains_nothing() {
        let region = Region::new(0x1000, 0, Perms::READ);
        assert!(!region.contains(0x1000));
        assert_eq!(region.remaining_from(0x1000), 0);
    }

    #[test]
    fn test_region_end_saturates() {
        let region = Region::new(u64::MAX - 4, 0x10, Perms::READ);
        assert_eq!(region.end(), u64::MAX);
        assert!(region.contains(u64::MAX - 1));
    }

    #[test]
    fn test_region_serde_roundtrip() {
        let region = Region::new(0x1000, 0x10, Perms::READ | Perms::EXEC);
        let json = serde_json::to_string(&region).unwrap();
        assert!(json.contains("\"r-x\""));
        let back: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(back, region);
    }

    #[test]
    fn test_map_resolve() {
        let map = RegionMap::from_regions([
            Region::new(0x1000, 0x10, Perms::READ),
            Region::new(0x2000, 0x100, Perms::RW),
        ])
        .unwrap();

        assert_eq!(map.resolve(0x1000).unwrap().base, 0x1000);
        assert_eq!(map.resolve(0x100f).unwrap().base, 0x1000);
        assert!(map.resolve(0x1010).is_none());
        assert!(map.resolve(0xfff).is_none());
        assert_eq!(map.resolve(0x2080).unwrap().base, 0x2000);
    }

    #[test]
    fn test_map_rejects_overlap() {
        let mut map = RegionMap::new();
        map.insert(Region::new(0x1000, 0x10, Perms::READ)).unwrap();

        // Tail of the existing region.
        assert!(map.insert(Region::new(0x1008, 0x10, Perms::READ)).is_err());
        // Head of the existing region.
        assert!(map.insert(Region::new(0xff0, 0x20, Perms::READ)).is_err());
        // Same base.
        assert!(map.insert(Region::new(0x1000, 0x4, Perms::READ)).is_err());
        // Adjacent on either side is fine.
        map.insert(Region::new(0x1010, 0x10, Perms::READ)).unwrap();
        map.insert(Region::new(0xff0, 0x10, Perms::READ)).unwrap();
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_map_end() {
        let mut map = RegionMap::new();
        assert_eq!(map.end(), 0);
        map.insert(Region::new(0x1000, 0x10, Perms::READ)).unwrap();
        map.insert(Region::new(0x4000, 0x40, Perms::READ)).unwrap();
        assert_eq!(map.end(), 0x4040);
    }

    #[test]
    fn test_map_remove() {
        let mut map = RegionMap::new();
        map.insert(Region::new(0x1000, 0x10, Perms::READ)).unwrap();
        assert!(map.remove(0x1000).is_some());
        assert!(map.resolve(0x1005).is_none());
        assert!(map.remove(0x1000).is_none());
        assert!(map.is_empty());
    }
}
