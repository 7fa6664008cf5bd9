//! Ordered list of known guides, with the "no guide" sentinel at position 0.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{PedibusError, Result};
use crate::guide::Guide;

/// Read-only after load. Position 0 is always [`Guide::none`].
#[derive(Debug, Clone)]
pub struct Roster {
    guides: Vec<Guide>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            guides: vec![Guide::none()],
        }
    }
}

impl Roster {
    /// A roster holding only the sentinel.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a roster from guides in load order. The sentinel is prepended.
    pub fn from_guides(guides: impl IntoIterator<Item = Guide>) -> Self {
        let mut roster = Self::default();
        roster.guides.extend(guides);
        roster
    }

    /// Read `<name> [<phoneNumber>]` records, one per line. Blank lines are skipped.
    pub fn load<R: BufRead>(source: R) -> Result<Self> {
        let mut guides = Vec::new();
        for line in source.lines() {
            if let Some(guide) = Guide::parse_record(&line?) {
                guides.push(guide);
            }
        }
        Ok(Self::from_guides(guides))
    }

    /// Load the roster from a guide-list file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).map_err(|e| PedibusError::load(path, e.into()))?;
        let roster =
            Self::load(BufReader::new(file)).map_err(|e| PedibusError::load(path, e))?;
        info!(path = %path.display(), guides = roster.guides.len() - 1, "loaded roster");
        Ok(roster)
    }

    /// Position of the first non-sentinel guide named `guide_name`.
    ///
    /// Absent names and names with no match resolve to 0 (the sentinel).
    pub fn position_of(&self, guide_name: Option<&str>) -> usize {
        let Some(name) = guide_name else {
            return 0;
        };
        let pos = self
            .guides
            .iter()
            .skip(1)
            .position(|g| g.name() == name)
            .map(|i| i + 1)
            .unwrap_or(0);
        debug!(guide = name, pos, "resolved guide position");
        pos
    }

    /// Guide at `index`. Callers derive indices from [`position_of`](Self::position_of)
    /// or from iterating the roster.
    pub fn at(&self, index: usize) -> Result<&Guide> {
        self.guides.get(index).ok_or(PedibusError::GuideIndex {
            index,
            len: self.guides.len(),
        })
    }

    /// Guide matching `guide_name`, or the sentinel.
    pub fn resolve(&self, guide_name: Option<&str>) -> &Guide {
        &self.guides[self.position_of(guide_name)]
    }

    pub fn sentinel(&self) -> &Guide {
        &self.guides[0]
    }

    /// Number of entries, sentinel included.
    pub fn len(&self) -> usize {
        self.guides.len()
    }

    /// True when only the sentinel is present.
    pub fn is_empty(&self) -> bool {
        self.guides.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Guide> {
        self.guides.iter()
    }

    /// Non-sentinel guides in load order.
    pub fn guides(&self) -> &[Guide] {
        &self.guides[1..]
    }
}
