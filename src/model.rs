//! Structured values decoded from composite result strings.

use crate::wire::{Point, Rect};

/// Outcome of a search or detection procedure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindResult {
    pub found: bool,
    pub items: Vec<FindItem>,
}

impl FindResult {
    /// Nothing was found.
    pub fn none() -> Self {
        Self {
            found: false,
            items: Vec::new(),
        }
    }

    pub fn one(item: FindItem) -> Self {
        Self {
            found: true,
            items: vec![item],
        }
    }

    pub fn many(items: Vec<FindItem>) -> Self {
        Self { found: true, items }
    }

    pub fn first(&self) -> Option<&FindItem> {
        self.items.first()
    }
}

/// One matched item. Which fields are set depends on the procedure that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindItem {
    pub index: Option<i32>,
    pub name: Option<String>,
    pub point: Option<Point>,
    pub probability: Option<i32>,
    pub rect: Option<Rect>,
}

impl FindItem {
    /// A match identified by its position in the searched list.
    pub fn indexed_point(index: i32, point: Point) -> Self {
        Self {
            index: Some(index),
            point: Some(point),
            ..Self::default()
        }
    }

    /// A match identified by index and name.
    pub fn named_point(index: i32, name: impl Into<String>, point: Point) -> Self {
        Self {
            index: Some(index),
            name: Some(name.into()),
            point: Some(point),
            ..Self::default()
        }
    }

    /// A detection box with label and confidence.
    pub fn detection(name: impl Into<String>, probability: i32, rect: Rect) -> Self {
        Self {
            name: Some(name.into()),
            probability: Some(probability),
            rect: Some(rect),
            ..Self::default()
        }
    }
}

/// Basic information about a running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub name: String,
    pub path: String,
    pub cpu: i32,
    pub memory: i64,
}
