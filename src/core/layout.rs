//! Geometry of a decoration: extents, content rect and button layout.
//!
//! Everything here is a pure function of the configuration, the nine-patch
//! metadata and the box the host assigned to the decoration. All values are
//! logical pixels, relative to the assigned box.
//!
//! The bar is a frame around the window body. Each edge of the frame is
//! `offset + nine-patch padding + uniform padding` thick. One edge, selected
//! by the [`Placement`], is the *content rect* that holds the title, the app
//! icon and the buttons.
//!
//! Buttons are laid out along the primary axis of the content rect (the
//! horizontal axis for top/bottom bars, the vertical axis for left/right bars).
//! Layout is always computed in a frame where the primary axis is X, and
//! transposed back for vertical bars.

use crate::config::BarConfig;
use crate::core::ninepatch::NinePatchInfo;
use crate::types::{ButtonAlignment, Extents, Logical, Placement, Rectangle, Size};

/// The subset of the configuration that affects layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// The edge holding the content rect.
    pub placement: Placement,
    /// The end the button row starts from.
    pub alignment: ButtonAlignment,
    /// Uniform padding inside each edge.
    pub padding: f64,
    /// Gap between adjacent buttons.
    pub button_padding: f64,
    /// Whether the app icon takes up space at the start of the content rect.
    pub icon: bool,
}

impl From<&BarConfig> for LayoutParams {
    fn from(config: &BarConfig) -> Self {
        LayoutParams {
            placement: config.placement,
            alignment: config.buttons_alignment,
            padding: config.padding as f64,
            button_padding: config.button_padding as f64,
            icon: config.appicon_enabled,
        }
    }
}

/// The thickness of each edge of the frame.
///
/// Each edge is its configured offset, plus the nine-patch content padding
/// on that edge, plus the uniform padding.
pub fn frame_extents(config: &BarConfig, patch: &NinePatchInfo) -> Extents {
    let p = config.padding as f64;
    Extents::new(
        (config.offset_left + patch.padding[0] as i32) as f64 + p,
        (config.offset_top + patch.padding[1] as i32) as f64 + p,
        (config.offset_right + patch.padding[2] as i32) as f64 + p,
        (config.offset_bottom + patch.padding[3] as i32) as f64 + p,
    )
}

/// The extents the decoration asks the host for.
///
/// These are zero on every edge when decorations are disabled or the bar is
/// hidden on this window, and the frame thickness otherwise.
pub fn desired_extents(config: &BarConfig, patch: &NinePatchInfo, hidden: bool) -> Extents {
    if !config.enabled || hidden {
        return Extents::zeroed()
    }
    frame_extents(config, patch)
}

/// The rect holding title, icon and buttons, relative to the assigned box.
///
/// For top/bottom bars this spans the box width minus the left and right
/// frame edges, and is as tall as its own edge. For left/right bars the
/// roles of width and height swap.
pub fn content_rect(
    placement: Placement,
    assigned: Size<f64, Logical>,
    frame: &Extents,
) -> Rectangle<f64, Logical> {
    let (w, h) = (assigned.width, assigned.height);
    let Extents { left, top, right, bottom } = *frame;

    match placement {
        Placement::Top => Rectangle::new(left, 0., w - left - right, top),
        Placement::Bottom => Rectangle::new(left, h - bottom, w - left - right, bottom),
        Placement::Left => Rectangle::new(0., top, left, h - top - bottom),
        Placement::Right => Rectangle::new(w - right, top, right, h - top - bottom),
    }
}

/// The carved-out interior of the frame, where the window body is.
pub fn interior(assigned: Size<f64, Logical>, frame: &Extents) -> Rectangle<f64, Logical> {
    Rectangle::from_size(assigned).shrink(frame)
}

/// Converts a content rect into the frame where the primary axis is X.
fn to_primary_frame(placement: Placement, content: &Rectangle<f64, Logical>) -> Rectangle<f64, Logical> {
    if placement.is_vertical() {
        content.transposed()
    } else {
        *content
    }
}

/// The space reserved at the start of the content rect for the app icon:
/// a square as large as the content rect is thick.
pub fn icon_reserved(params: &LayoutParams, content: &Rectangle<f64, Logical>) -> f64 {
    if params.icon {
        to_primary_frame(params.placement, content).size.height
    } else {
        0.
    }
}

/// The extent of a button along the primary axis.
fn along(placement: Placement, size: &Size<f64, Logical>) -> f64 {
    if placement.is_vertical() { size.height } else { size.width }
}

/// How many buttons fit into the content rect.
///
/// Buttons are taken in order, and each needs its primary-axis size plus the
/// button padding. The first button that does not fit, and every button after
/// it, is hidden; buttons are never shrunk to fit.
pub fn visible_button_count(
    params: &LayoutParams,
    content: &Rectangle<f64, Logical>,
    buttons: &[Size<f64, Logical>],
) -> usize {
    let primary = to_primary_frame(params.placement, content).size.width;
    let mut available = primary - 2. * params.padding - icon_reserved(params, content);

    let mut count = 0;
    for button in buttons {
        let space = along(params.placement, button) + params.button_padding;
        if available >= space {
            count += 1;
            available -= space;
        } else {
            break
        }
    }
    count
}

/// The rects of each visible button, in the same space as `content`.
///
/// Buttons are placed consecutively from the near edge (left alignment, after
/// the icon) or the far edge (right alignment), advancing by their size plus
/// the button padding, and are centered across the primary axis.
pub fn button_rects(
    params: &LayoutParams,
    content: &Rectangle<f64, Logical>,
    buttons: &[Size<f64, Logical>],
) -> Vec<Rectangle<f64, Logical>> {
    let count = visible_button_count(params, content, buttons);
    let vertical = params.placement.is_vertical();
    let frame = to_primary_frame(params.placement, content);
    let (primary, cross) = (frame.size.width, frame.size.height);

    let mut offset = params.padding + match params.alignment {
        ButtonAlignment::Left => icon_reserved(params, content),
        ButtonAlignment::Right => 0.,
    };

    buttons[..count]
        .iter()
        .map(|button| {
            let size = if vertical { button.transposed() } else { *button };
            let x = match params.alignment {
                ButtonAlignment::Left => offset,
                ButtonAlignment::Right => primary - offset - size.width,
            };
            let y = ((cross - size.height) / 2.).floor();
            offset += size.width + params.button_padding;

            let local = Rectangle::new(x.floor(), y, size.width, size.height);
            let local = if vertical { local.transposed() } else { local };
            local.translate(content.point)
        })
        .collect()
}

/// The total primary-axis space taken by the visible buttons, including the
/// padding on either side of each one.
pub fn buttons_span(params: &LayoutParams, buttons: &[Size<f64, Logical>], count: usize) -> f64 {
    buttons[..count.min(buttons.len())]
        .iter()
        .fold(params.button_padding, |acc, b| {
            acc + along(params.placement, b) + params.button_padding
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::config::no_checks;

    fn config(placement: Placement) -> BarConfig {
        BarConfig::builder()
            .placement(placement)
            .padding(4)
            .offset_left(1)
            .offset_top(20)
            .offset_right(3)
            .offset_bottom(2)
            .finish(no_checks)
            .unwrap()
    }

    fn patch() -> NinePatchInfo {
        NinePatchInfo {
            border: [2, 2, 2, 2],
            padding: [1, 2, 3, 4],
            defined: true,
        }
    }

    #[test]
    fn test_extents() {
        let cfg = config(Placement::Top);
        let ext = desired_extents(&cfg, &patch(), false);
        assert_eq!(ext, Extents::new(6., 26., 10., 10.));

        assert!(desired_extents(&cfg, &patch(), true).is_zero());

        let disabled = BarConfig::builder().enabled(false).finish(no_checks).unwrap();
        assert!(desired_extents(&disabled, &patch(), false).is_zero());
    }

    #[test]
    fn test_content_rect_sums_to_box() {
        let assigned = Size::new(640., 480.);

        for placement in [Placement::Top, Placement::Bottom, Placement::Left, Placement::Right] {
            let cfg = config(placement);
            let frame = frame_extents(&cfg, &patch());
            let rect = content_rect(placement, assigned, &frame);

            if placement.is_vertical() {
                assert_eq!(rect.size.height + frame.top + frame.bottom, assigned.height, "{placement}");
            } else {
                assert_eq!(rect.size.width + frame.left + frame.right, assigned.width, "{placement}");
            }

            let thickness = match placement {
                Placement::Top => frame.top,
                Placement::Bottom => frame.bottom,
                Placement::Left => frame.left,
                Placement::Right => frame.right,
            };
            let cross = if placement.is_vertical() { rect.size.width } else { rect.size.height };
            assert_eq!(cross, thickness, "{placement}");

            let interior = interior(assigned, &frame);
            assert!(rect.right() <= assigned.width && rect.bottom() <= assigned.height);
            assert!(!interior.contains_point(rect.point), "{placement}");
        }
    }

    fn params(alignment: ButtonAlignment, placement: Placement) -> LayoutParams {
        LayoutParams {
            placement,
            alignment,
            padding: 5.,
            button_padding: 2.,
            icon: true,
        }
    }

    #[test]
    fn test_visible_count_cutoff() {
        let p = params(ButtonAlignment::Right, Placement::Top);
        // 100 wide, 20 thick: 100 - 10 - 20 = 70 available
        let content = Rectangle::new(0., 0., 100., 20.);
        let buttons = [Size::new(30., 16.), Size::new(40., 16.), Size::new(10., 16.)];

        // 32 fits, 42 does not: the third button is hidden even though it would fit
        assert_eq!(visible_button_count(&p, &content, &buttons), 1);
    }

    fn placement() -> impl Strategy<Value = Placement> {
        prop_oneof![
            Just(Placement::Top),
            Just(Placement::Bottom),
            Just(Placement::Left),
            Just(Placement::Right),
        ]
    }

    proptest! {
        #[test]
        fn test_visible_count_is_monotonic(
            placement in placement(),
            right in any::<bool>(),
            icon in any::<bool>(),
            buttons in prop::collection::vec((1u32..40, 1u32..40), 0..8),
            narrow in 0u32..300,
            extra in 0u32..300,
        ) {
            let p = LayoutParams {
                icon,
                alignment: if right { ButtonAlignment::Right } else { ButtonAlignment::Left },
                ..params(ButtonAlignment::Left, placement)
            };
            let sizes: Vec<_> = buttons.iter().map(|&(w, h)| Size::new(w as f64, h as f64)).collect();
            let content = |length: u32| {
                if placement.is_vertical() {
                    Rectangle::new(0., 0., 20., length as f64)
                } else {
                    Rectangle::new(0., 0., length as f64, 20.)
                }
            };

            let small = visible_button_count(&p, &content(narrow), &sizes);
            let large = visible_button_count(&p, &content(narrow + extra), &sizes);
            prop_assert!(small <= large, "{} buttons at {}, {} at {}", small, narrow, large, narrow + extra);
            prop_assert!(large <= sizes.len());
        }
    }

    #[test]
    fn test_button_rects_right_aligned() {
        let p = params(ButtonAlignment::Right, Placement::Top);
        let content = Rectangle::new(10., 0., 200., 20.);
        let buttons = [Size::new(16., 16.), Size::new(12., 12.)];

        let rects = button_rects(&p, &content, &buttons);
        assert_eq!(rects, vec![
            Rectangle::new(10. + 200. - 5. - 16., 2., 16., 16.),
            Rectangle::new(10. + 200. - 23. - 12., 4., 12., 12.),
        ]);
    }

    #[test]
    fn test_button_rects_left_aligned_skip_icon() {
        let p = params(ButtonAlignment::Left, Placement::Top);
        let content = Rectangle::new(0., 0., 200., 20.);
        let rects = button_rects(&p, &content, &[Size::new(16., 16.)]);

        // padding + icon square
        assert_eq!(rects[0].point.x, 25.);
    }

    #[test]
    fn test_button_rects_vertical() {
        let p = params(ButtonAlignment::Left, Placement::Left);
        let content = Rectangle::new(0., 30., 20., 200.);
        let rects = button_rects(&p, &content, &[Size::new(16., 10.)]);

        // primary axis is Y: padding + icon (20 thick) from the top of the rect
        assert_eq!(rects[0], Rectangle::new(2., 30. + 25., 16., 10.));
    }
}
