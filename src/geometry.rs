//! Points and boxes in layout (global) or surface-local coordinates.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A 2D point. `Point<f64>` is used for the cursor and surface-local
/// coordinates, `Point<i32>` for scene node positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point<T = f64> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl Point<i32> {
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }

    pub fn to_f64(self) -> Point<f64> {
        Point::new(self.x as f64, self.y as f64)
    }
}

impl Point<f64> {
    /// Truncates toward zero, the way scene positions are derived from the cursor.
    pub fn to_i32(self) -> Point<i32> {
        Point::new(self.x as i32, self.y as i32)
    }
}

impl<T: Add<Output = T>> Add for Point<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Sub<Output = T>> Sub for Point<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T> From<(T, T)> for Point<T> {
    fn from((x, y): (T, T)) -> Self {
        Point::new(x, y)
    }
}

/// Rectangle for window positioning and sizing
///
/// Width and height are signed so that edge arithmetic during a resize can
/// be done without casts; a well-formed box has both strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_loc_and_size((x, y): (i32, i32), (width, height): (i32, i32)) -> Self {
        Self::new(x, y, width, height)
    }

    pub fn loc(&self) -> Point<i32> {
        Point::new(self.x, self.y)
    }

    /// Edges saturate: box values come from clients and may be huge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Half-open containment test: the right and bottom edges are outside.
    pub fn contains(&self, point: Point<f64>) -> bool {
        point.x >= self.x as f64
            && point.y >= self.y as f64
            && point.x < self.right() as f64
            && point.y < self.bottom() as f64
    }

    /// Same box shifted by `offset`.
    pub fn translated(&self, offset: Point<i32>) -> Self {
        Self::new(
            self.x.saturating_add(offset.x),
            self.y.saturating_add(offset.y),
            self.width,
            self.height,
        )
    }

    /// Smallest box containing both; an empty box is the identity.
    pub fn merge(&self, other: &Rectangle) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }

    /// Closest point inside the box, treating the right/bottom edge as
    /// exclusive by one unit.
    pub fn clamp(&self, point: Point<f64>) -> Point<f64> {
        let max_x = self.right().saturating_sub(1).max(self.x) as f64;
        let max_y = self.bottom().saturating_sub(1).max(self.y) as f64;
        Point::new(
            point.x.clamp(self.x as f64, max_x),
            point.y.clamp(self.y as f64, max_y),
        )
    }
}
