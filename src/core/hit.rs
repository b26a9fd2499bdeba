//! Classification of points against a decoration.

use crate::types::{Extents, Logical, Point, Rectangle, Size};

use super::layout;

/// What a point on or around a decoration resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hit {
    /// Not on the interactive part of the bar: either off the assigned box
    /// entirely, or over the window body the frame surrounds.
    Outside,
    /// On the frame, but not on any button.
    Background,
    /// On the button with this index.
    Button(usize),
}

impl Hit {
    /// Whether the point is anywhere on the interactive bar.
    pub fn on_bar(&self) -> bool {
        !matches!(self, Hit::Outside)
    }

    /// The button index, if the point is on a button.
    pub fn button(&self) -> Option<usize> {
        match self {
            Hit::Button(idx) => Some(*idx),
            _ => None,
        }
    }
}

/// The frame of a decoration: its assigned box and the interior carved out of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarFrame {
    /// The whole assigned box, anchored at the origin.
    pub bounds: Rectangle<f64, Logical>,
    /// The window body inside the frame.
    pub interior: Rectangle<f64, Logical>,
}

impl BarFrame {
    /// Builds the frame of a box of `size` with edges as thick as `frame`.
    pub fn new(size: Size<f64, Logical>, frame: &Extents) -> Self {
        BarFrame {
            bounds: Rectangle::from_size(size),
            interior: layout::interior(size, frame),
        }
    }
}

/// Classifies a point, given relative to the assigned box.
///
/// Buttons are tested before the background, in layout order, so the first
/// matching button wins if any overlap.
pub fn classify(
    point: Point<f64, Logical>,
    frame: &BarFrame,
    buttons: &[Rectangle<f64, Logical>],
) -> Hit {
    if !frame.bounds.contains_point(point) {
        return Hit::Outside
    }

    if let Some(idx) = buttons.iter().position(|rect| rect.contains_point(point)) {
        return Hit::Button(idx)
    }

    if frame.interior.contains_point(point) {
        Hit::Outside
    } else {
        Hit::Background
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_frame_vs_interior(
            width in 50u32..450,
            height in 50u32..450,
            (left, top, right, bottom) in (0u32..20, 0u32..20, 0u32..20, 0u32..20),
            (fx, fy) in (0f64..1., 0f64..1.),
        ) {
            let size = Size::new(width as f64, height as f64);
            let ext = Extents::new(left as f64, top as f64, right as f64, bottom as f64);
            let frame = BarFrame::new(size, &ext);

            let pt = Point::new(fx * size.width, fy * size.height);
            let hit = classify(pt, &frame, &[]);

            let in_interior = pt.x >= ext.left && pt.x < size.width - ext.right
                && pt.y >= ext.top && pt.y < size.height - ext.bottom;
            if in_interior {
                prop_assert_eq!(hit, Hit::Outside, "{:?} in {:?}", pt, ext);
            } else {
                prop_assert_eq!(hit, Hit::Background, "{:?} in {:?}", pt, ext);
            }
        }
    }

    #[test]
    fn test_outside_box() {
        let frame = BarFrame::new(Size::new(100., 100.), &Extents::new(5., 20., 5., 5.));

        assert_eq!(classify(Point::new(-1., 10.), &frame, &[]), Hit::Outside);
        assert_eq!(classify(Point::new(50., 100.), &frame, &[]), Hit::Outside);
        assert_eq!(classify(Point::new(50., 10.), &frame, &[]), Hit::Background);
    }

    #[test]
    fn test_buttons_first_match_wins() {
        let frame = BarFrame::new(Size::new(100., 100.), &Extents::new(5., 20., 5., 5.));
        let buttons = [
            Rectangle::new(60., 2., 16., 16.),
            Rectangle::new(70., 2., 16., 16.),
        ];

        assert_eq!(classify(Point::new(72., 10.), &frame, &buttons), Hit::Button(0));
        assert_eq!(classify(Point::new(80., 10.), &frame, &buttons), Hit::Button(1));
        assert_eq!(classify(Point::new(20., 10.), &frame, &buttons), Hit::Background);
    }
}
