//! Resource model.
//!
//! Resources are the scarce entities a session occupies while it runs:
//! the lecturer teaching it, the venue it is held in, and the student
//! group and class attending it. Each is identified by a [`ResourceKey`].
//!
//! Venues are catalog entries with a capacity and location. A remote venue
//! stands for online delivery and has unlimited concurrent capacity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used by the built-in remote venue sentinel.
pub const REMOTE_VENUE_NAME: &str = "Remote";

/// Identifies a scarce resource that cannot be double-booked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKey {
    /// A lecturer (by staff identifier).
    Lecturer(String),
    /// A venue (by name).
    Venue(String),
    /// A student group (tutorial/lab group).
    Group(String),
    /// A class (cohort) within a semester.
    Class(String),
}

impl ResourceKey {
    /// Creates a lecturer key.
    pub fn lecturer(id: impl Into<String>) -> Self {
        Self::Lecturer(id.into())
    }

    /// Creates a venue key.
    pub fn venue(name: impl Into<String>) -> Self {
        Self::Venue(name.into())
    }

    /// Creates a group key.
    pub fn group(id: impl Into<String>) -> Self {
        Self::Group(id.into())
    }

    /// Creates a class key.
    pub fn class(id: impl Into<String>) -> Self {
        Self::Class(id.into())
    }

    /// Resource kind label (`"lecturer"`, `"venue"`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceKey::Lecturer(_) => "lecturer",
            ResourceKey::Venue(_) => "venue",
            ResourceKey::Group(_) => "group",
            ResourceKey::Class(_) => "class",
        }
    }

    /// Identifier of the resource.
    pub fn id(&self) -> &str {
        match self {
            ResourceKey::Lecturer(id)
            | ResourceKey::Venue(id)
            | ResourceKey::Group(id)
            | ResourceKey::Class(id) => id,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.id())
    }
}

/// A venue (room) from the venue catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Unique venue name.
    pub name: String,
    /// Seats available. Ignored for remote venues.
    pub capacity: u32,
    /// Building / campus location label.
    pub location: String,
    /// Whether this venue represents online delivery.
    pub is_remote: bool,
}

impl Venue {
    /// Creates a physical venue.
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
            location: String::new(),
            is_remote: false,
        }
    }

    /// The "Remote" sentinel used for pure-online delivery.
    pub fn remote() -> Self {
        Self {
            name: REMOTE_VENUE_NAME.to_string(),
            capacity: u32::MAX,
            location: "Online".to_string(),
            is_remote: true,
        }
    }

    /// Sets the location label.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Marks this venue as remote.
    pub fn as_remote(mut self) -> Self {
        self.is_remote = true;
        self
    }

    /// Whether `student_count` students fit in this venue.
    ///
    /// Remote venues always fit.
    pub fn fits(&self, student_count: u32) -> bool {
        self.is_remote || self.capacity >= student_count
    }

    /// Seats left over after seating `student_count` students.
    pub fn spare_capacity(&self, student_count: u32) -> u32 {
        self.capacity.saturating_sub(student_count)
    }

    /// Ledger key for this venue.
    pub fn key(&self) -> ResourceKey {
        ResourceKey::Venue(self.name.clone())
    }
}

/// Remote venues in a catalog, or the built-in sentinel if there are none.
pub fn remote_venues(catalog: &[Venue]) -> Vec<Venue> {
    let remote: Vec<Venue> = catalog.iter().filter(|v| v.is_remote).cloned().collect();
    if remote.is_empty() {
        vec![Venue::remote()]
    } else {
        remote
    }
}

/// Physical venues in a catalog that seat `student_count` students.
pub fn physical_venues(catalog: &[Venue], student_count: u32) -> Vec<Venue> {
    catalog
        .iter()
        .filter(|v| !v.is_remote && v.fits(student_count))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_builder() {
        let v = Venue::new("LT-1", 120).with_location("Block A");
        assert_eq!(v.name, "LT-1");
        assert_eq!(v.capacity, 120);
        assert_eq!(v.location, "Block A");
        assert!(!v.is_remote);
        assert_eq!(v.key(), ResourceKey::venue("LT-1"));
    }

    #[test]
    fn test_venue_fits() {
        let v = Venue::new("R1", 30);
        assert!(v.fits(30));
        assert!(!v.fits(31));
        assert_eq!(v.spare_capacity(20), 10);
        assert_eq!(v.spare_capacity(40), 0);

        let r = Venue::remote();
        assert!(r.fits(10_000));
        assert_eq!(r.name, REMOTE_VENUE_NAME);
    }

    #[test]
    fn test_remote_venues_sentinel() {
        let catalog = vec![Venue::new("R1", 30), Venue::new("R2", 60)];
        let remote = remote_venues(&catalog);
        assert_eq!(remote.len(), 1);
        assert!(remote[0].is_remote);

        let with_remote = vec![Venue::new("R1", 30), Venue::new("Zoom-A", 0).as_remote()];
        let remote = remote_venues(&with_remote);
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].name, "Zoom-A");
    }

    #[test]
    fn test_physical_venues_capacity_filter() {
        let catalog = vec![
            Venue::new("Small", 20),
            Venue::new("Large", 100),
            Venue::remote(),
        ];
        let fit = physical_venues(&catalog, 50);
        assert_eq!(fit.len(), 1);
        assert_eq!(fit[0].name, "Large");
    }

    #[test]
    fn test_resource_key_display() {
        assert_eq!(ResourceKey::lecturer("L7").to_string(), "lecturer 'L7'");
        assert_eq!(ResourceKey::group("G1").kind(), "group");
        assert_eq!(ResourceKey::class("CS-1A").id(), "CS-1A");
    }
}
