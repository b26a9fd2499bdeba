//! Primitives for working with decoration geometries.
//!
//! This module contains the core types [`Scale`], [`Point`], [`Size`], [`Rectangle`]
//! and [`Extents`], which are used to describe bar boxes, content rectangles and
//! button hit areas.
//!
//! All types in this module are generic over a [`Scalar`], which is a type that can act as a scalar
//! in a 2D coordinate space. In practice, layout math happens in `f64` and the final pixel
//! buffers are sized in `i32`.
//!
//! ## Physical and Logical Coordinate Spaces
//!
//! The `Point`, `Size`, and `Rectangle` types are additionally generic over a marker type that implements
//! [`GeometryKind`]. Layout is computed in [`Logical`] space (relative to the window, before the
//! monitor scale is applied), while textures and blits are sized in [`Physical`] pixels.

use core::ops::{Add, Sub, AddAssign, SubAssign, Neg};

use std::marker::PhantomData;

pub mod marker {
    //! Marker types for marking Size, Point and Rectangle kind, Physical or Logical.
    //!
    //! Conversion methods take the scale factor *relative to the Logical space*, that
    //! is, the monitor scale.

    mod private {
        pub trait Sealed {}
    }

    use core::ops::{Add, Sub};

    /// A sealed trait for marking types as Scalars, that can be used in Points and Rectangles.
    pub trait Scalar:
        Sized
        + Copy
        + PartialEq
        + PartialOrd
        + Add<Self, Output = Self>
        + Sub<Self, Output = Self>
        + Default
    {
        /// The zero point of the Scalar. Usually, this is the additive identity of the Scalar.
        const ZERO: Self;

        /// Convert to this Scalar from an f64.
        fn from_f64(v: f64) -> Self;

        /// Convert this Scalar to an f64.
        fn to_f64(self) -> f64;

        #[inline]
        /// Check if the Scalar is greater than its zero.
        fn positive(self) -> bool {
            self > Self::ZERO
        }
    }

    macro_rules! __impl_scalar_integer {
        ($($targ:ty),+) => {
            $(
                impl Scalar for $targ {
                    const ZERO: Self = 0;

                    #[inline]
                    fn from_f64(v: f64) -> Self {
                        v as Self
                    }

                    #[inline]
                    fn to_f64(self) -> f64 {
                        self as f64
                    }
                }
            )+
        };
    }

    macro_rules! __impl_scalar_floating {
        ($($targ:ty),+) => {
            $(
                impl Scalar for $targ {
                    const ZERO: Self = 0.;

                    #[inline]
                    fn from_f64(v: f64) -> Self {
                        v as Self
                    }

                    #[inline]
                    fn to_f64(self) -> f64 {
                        self as f64
                    }
                }
            )+
        };
    }

    __impl_scalar_integer!(i32, i64, u32);
    __impl_scalar_floating!(f32, f64);

    /// A sealed trait defining marker types `Logical` and `Physical`.
    pub trait GeometryKind: Copy + PartialEq + core::fmt::Debug + private::Sealed {}

    macro_rules! __impl_geometrykind {
        {$(#[$outer:meta])? $targ:ident} => {
            $(
                #[$outer]
            )?
            #[derive(Debug, Default, Clone, Copy, PartialEq)]
            pub struct $targ;

            impl private::Sealed for $targ {}
            impl GeometryKind for $targ {}
        };
    }

    __impl_geometrykind!{
        /// A type for marking geometrical types as logical.
        Logical
    }
    __impl_geometrykind!{
        /// A type for marking geometrical types as physical.
        Physical
    }
}

pub use marker::{GeometryKind, Logical, Physical, Scalar};

/// A uniform scale factor, typically the scale of the monitor a bar is drawn on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(pub f64);

impl Scale {
    /// Returns an identity Scale, that has no effect on scaling operations.
    pub const fn id() -> Scale {
        Scale(1.0)
    }

    /// The raw scale factor.
    pub fn factor(self) -> f64 {
        self.0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::id()
    }
}

impl From<f64> for Scale {
    fn from(from: f64) -> Self {
        Scale(from)
    }
}

/// A type for representing a point on a display or inside a bar.
///
/// # Note
///
/// The (0, 0) reference is by default taken from the top left
/// corner of the 2D plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point<N: Scalar, Kind: GeometryKind> {
    /// The `Point`'s X-coordinate.
    pub x: N,
    /// The `Point`'s Y-coordinate.
    pub y: N,
    _kind: PhantomData<Kind>,
}

impl<N: Scalar, Kind: GeometryKind> Add for Point<N, Kind> {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl<N: Scalar, Kind: GeometryKind> AddAssign for Point<N, Kind> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl<N: Scalar, Kind: GeometryKind> Sub for Point<N, Kind> {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl<N: Scalar, Kind: GeometryKind> SubAssign for Point<N, Kind> {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl<N, Kind> Neg for Point<N, Kind>
where
    N: Scalar + Neg<Output = N>,
    Kind: GeometryKind,
{
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl<N: Scalar, Kind: GeometryKind> From<(N, N)> for Point<N, Kind> {
    fn from(from: (N, N)) -> Self {
        Self::new(from.0, from.1)
    }
}

impl<N: Scalar, Kind: GeometryKind> Point<N, Kind> {
    /// Creates a new Point.
    pub const fn new(x: N, y: N) -> Point<N, Kind> {
        Point { x, y, _kind: PhantomData }
    }

    /// Creates a new Point where both coordinates are zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use decobar::types::{Point, Logical};
    ///
    /// let point1 = Point::<i32, Logical>::zeroed();
    /// let point2 = Point::<i32, Logical>::new(0, 0);
    ///
    /// assert_eq!(point1, point2);
    /// ```
    pub const fn zeroed() -> Point<N, Kind> {
        Point { x: N::ZERO, y: N::ZERO, _kind: PhantomData }
    }

    /// Converts `self` to a `Point<f64, Kind>`.
    pub fn as_f64(&self) -> Point<f64, Kind> {
        Point::new(self.x.to_f64(), self.y.to_f64())
    }

    /// Swaps the X and Y coordinates.
    pub fn transposed(self) -> Self {
        Self::new(self.y, self.x)
    }
}

impl<Kind: GeometryKind> Point<f64, Kind> {
    /// Rounds both coordinates to the nearest integer.
    pub fn round(self) -> Point<i32, Kind> {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl Point<f64, Logical> {
    /// Converts the point from Logical space into Physical space with the given scale.
    pub fn as_physical(self, scale: Scale) -> Point<f64, Physical> {
        Point::new(self.x * scale.0, self.y * scale.0)
    }
}

/// A type for representing the size of a bar, texture or button.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size<N: Scalar, Kind: GeometryKind> {
    /// The width of the `Size`.
    pub width: N,
    /// The height of the `Size`.
    pub height: N,
    _kind: PhantomData<Kind>,
}

impl<N: Scalar, Kind: GeometryKind> From<(N, N)> for Size<N, Kind> {
    fn from(from: (N, N)) -> Self {
        Self::new(from.0, from.1)
    }
}

impl<N: Scalar, Kind: GeometryKind> Size<N, Kind> {
    /// Creates a new `Size`.
    pub const fn new(width: N, height: N) -> Self {
        Size { width, height, _kind: PhantomData }
    }

    /// Creates a `Size` where both dimensions are zero.
    pub const fn zeroed() -> Self {
        Size { width: N::ZERO, height: N::ZERO, _kind: PhantomData }
    }

    /// Converts `self` to a `Size<f64, Kind>`.
    pub fn as_f64(&self) -> Size<f64, Kind> {
        Size::new(self.width.to_f64(), self.height.to_f64())
    }

    /// Whether either dimension is zero or negative.
    pub fn is_empty(&self) -> bool {
        !(self.width.positive() && self.height.positive())
    }

    /// Swaps the width and height.
    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl<Kind: GeometryKind> Size<f64, Kind> {
    /// Rounds both dimensions to the nearest integer.
    pub fn round(self) -> Size<i32, Kind> {
        Size::new(self.width.round() as i32, self.height.round() as i32)
    }
}

impl Size<f64, Logical> {
    /// Converts the size from Logical space into Physical space with the given scale.
    pub fn as_physical(self, scale: Scale) -> Size<f64, Physical> {
        Size::new(self.width * scale.0, self.height * scale.0)
    }
}

/// A type representing a rectangle: a point it is anchored to, and a size.
///
/// Rectangles take their gravity from the top-left corner, that is, (0, 0) is
/// considered the top left corner, and any increase is an offset to the right
/// or downwards.
///
/// _Note:_ The Default impl returns Rectangle {0, 0, 0, 0}.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle<N: Scalar, Kind: GeometryKind> {
    /// The point that the Rectangle is anchored to.
    pub point: Point<N, Kind>,
    /// The size of the Rectangle.
    pub size: Size<N, Kind>,
}

impl<N: Scalar, Kind: GeometryKind> Default for Rectangle<N, Kind> {
    fn default() -> Self {
        Rectangle::zeroed()
    }
}

impl<N: Scalar, Kind: GeometryKind> Rectangle<N, Kind> {
    /// Constructs a new `Rectangle` from its anchor and dimensions.
    pub fn new(x: N, y: N, width: N, height: N) -> Self {
        Rectangle {
            point: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Creates a new Rectangle of the given `size`, anchored at the origin (0, 0)
    pub fn from_size(size: Size<N, Kind>) -> Self {
        Rectangle {
            point: Point::zeroed(),
            size,
        }
    }

    /// Convenience function for constructing a `Rectangle` with all fields
    /// set to zero.
    pub fn zeroed() -> Self {
        Rectangle::new(N::ZERO, N::ZERO, N::ZERO, N::ZERO)
    }

    /// Converts `self` to a `Rectangle<f64, Kind>`.
    pub fn as_f64(&self) -> Rectangle<f64, Kind> {
        Rectangle {
            point: self.point.as_f64(),
            size: self.size.as_f64(),
        }
    }

    /// Whether the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// The X coordinate one past the right edge.
    pub fn right(&self) -> N {
        self.point.x + self.size.width
    }

    /// The Y coordinate one past the bottom edge.
    pub fn bottom(&self) -> N {
        self.point.y + self.size.height
    }

    /// Check whether this Rectangle contains a certain point.
    ///
    /// The left and top edges are inclusive, the right and bottom edges exclusive.
    ///
    /// # Example
    ///
    /// ```rust
    /// use decobar::types::{Rectangle, Point, Logical};
    ///
    /// let original = Rectangle::<i32, Logical>::new(0, 0, 200, 100);
    ///
    /// assert!(original.contains_point(Point::new(50, 50)));
    /// assert!(!original.contains_point(Point::new(200, 50)));
    /// ```
    pub fn contains_point(&self, pt: Point<N, Kind>) -> bool {
        let wrange = self.point.x..self.right();
        let hrange = self.point.y..self.bottom();

        wrange.contains(&pt.x) && hrange.contains(&pt.y)
    }

    /// Returns the Rectangle shifted by `offset`.
    #[must_use]
    pub fn translate(&self, offset: Point<N, Kind>) -> Self {
        Rectangle {
            point: self.point + offset,
            size: self.size,
        }
    }

    /// Mirrors the Rectangle across the main diagonal, swapping the roles of
    /// the X and Y axes.
    #[must_use]
    pub fn transposed(&self) -> Self {
        Rectangle {
            point: self.point.transposed(),
            size: self.size.transposed(),
        }
    }
}

impl<Kind: GeometryKind> Rectangle<f64, Kind> {
    /// Shrinks the Rectangle by the given extents on each side.
    ///
    /// The resulting size is clamped at zero.
    #[must_use]
    pub fn shrink(&self, extents: &Extents) -> Self {
        Rectangle::new(
            self.point.x + extents.left,
            self.point.y + extents.top,
            (self.size.width - extents.left - extents.right).max(0.),
            (self.size.height - extents.top - extents.bottom).max(0.),
        )
    }

    /// Rounds each field to the nearest integer.
    pub fn round(&self) -> Rectangle<i32, Kind> {
        Rectangle {
            point: self.point.round(),
            size: self.size.round(),
        }
    }
}

impl Rectangle<f64, Logical> {
    /// Converts the Rectangle from Logical space into Physical space with the given scale.
    pub fn as_physical(self, scale: Scale) -> Rectangle<f64, Physical> {
        Rectangle {
            point: self.point.as_physical(scale),
            size: self.size.as_physical(scale),
        }
    }
}

/// Per-edge insets around a window, in logical pixels.
///
/// Used both for the extents a decoration asks the host for, and for the
/// frame that surrounds the window body inside the assigned box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extents {
    /// The inset on the left edge.
    pub left: f64,
    /// The inset on the top edge.
    pub top: f64,
    /// The inset on the right edge.
    pub right: f64,
    /// The inset on the bottom edge.
    pub bottom: f64,
}

impl Extents {
    /// Creates a new set of Extents.
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    /// Extents that are zero on every edge.
    pub const fn zeroed() -> Self {
        Self::new(0., 0., 0., 0.)
    }

    /// Whether every edge is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::zeroed()
    }
}

impl Add for Extents {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(
            self.left + other.left,
            self.top + other.top,
            self.right + other.right,
            self.bottom + other.bottom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_half_open() {
        let rect = Rectangle::<f64, Logical>::new(10., 10., 20., 5.);

        assert!(rect.contains_point(Point::new(10., 10.)));
        assert!(rect.contains_point(Point::new(29.9, 14.9)));
        assert!(!rect.contains_point(Point::new(30., 12.)));
        assert!(!rect.contains_point(Point::new(15., 15.)));
    }

    #[test]
    fn test_transpose_roundtrip() {
        let rect = Rectangle::<f64, Logical>::new(1., 2., 3., 4.);
        let t = rect.transposed();

        assert_eq!(t, Rectangle::new(2., 1., 4., 3.));
        assert_eq!(t.transposed(), rect);
    }

    #[test]
    fn test_shrink_clamps_at_zero() {
        let rect = Rectangle::<f64, Logical>::new(0., 0., 100., 50.);
        let ext = Extents::new(5., 10., 15., 20.);

        let inner = rect.shrink(&ext);
        assert_eq!(inner, Rectangle::new(5., 10., 80., 20.));

        let tiny = Rectangle::<f64, Logical>::new(0., 0., 10., 10.).shrink(&ext);
        assert!(tiny.is_empty());
    }

    #[test]
    fn test_scale_conversion() {
        let rect = Rectangle::<f64, Logical>::new(2., 4., 10., 20.);
        let phys = rect.as_physical(Scale(1.5));

        assert_eq!(phys.round(), Rectangle::new(3, 6, 15, 30));
    }
}
