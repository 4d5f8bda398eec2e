//! Frame reconciliation: tab bar clamping, squeeze tracking and mirroring.

use serde::Serialize;
use tracing::debug;

use crate::geometry::Rect;
use crate::group::Group;
use crate::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampAdjustment {
    /// Frame already clears the tab bar.
    Unchanged,
    /// Moved below the tab bar; height kept because a squeeze is already on record.
    Repositioned,
    /// First squeeze: moved down and shortened by the tab bar height.
    Squeezed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampOutcome {
    pub frame: Rect,
    pub squeeze_delta: f64,
    pub adjustment: ClampAdjustment,
}

impl ClampOutcome {
    pub fn changed(&self) -> bool {
        self.adjustment != ClampAdjustment::Unchanged
    }
}

/// Pure frame rules. Writes and re-checks are driven by the coordinator.
#[derive(Debug, Clone, Copy)]
pub struct FrameReconciler {
    pub tab_bar_height: f64,
    pub position_tolerance: f64,
    pub echo_tolerance: f64,
}

impl FrameReconciler {
    pub fn new(tab_bar_height: f64, position_tolerance: f64, echo_tolerance: f64) -> Self {
        Self {
            tab_bar_height,
            position_tolerance,
            echo_tolerance,
        }
    }

    /// Keep `frame` below the tab bar reserved at the top of `visible`.
    ///
    /// With `existing_delta > 0` the group was squeezed before, so only the
    /// origin moves. Otherwise the first squeeze shortens the frame by the tab
    /// bar height and reports the new delta. Feeding the returned delta back
    /// in never grows it.
    pub fn clamp(&self, frame: Rect, visible: Rect, existing_delta: f64) -> ClampOutcome {
        let top = visible.y + self.tab_bar_height;

        if frame.y >= top {
            return ClampOutcome {
                frame,
                squeeze_delta: existing_delta,
                adjustment: ClampAdjustment::Unchanged,
            };
        }

        if existing_delta > 0.0 {
            let clamped = Rect { y: top, ..frame };
            debug!(
                event = "core.frame.reposition_applied",
                from_y = frame.y,
                to_y = top
            );
            return ClampOutcome {
                frame: clamped,
                squeeze_delta: existing_delta,
                adjustment: ClampAdjustment::Repositioned,
            };
        }

        let clamped = Rect {
            y: top,
            height: (frame.height - self.tab_bar_height).max(1.0),
            ..frame
        };
        debug!(
            event = "core.frame.squeeze_applied",
            from_y = frame.y,
            to_y = top,
            height = clamped.height,
            delta = self.tab_bar_height
        );
        ClampOutcome {
            frame: clamped,
            squeeze_delta: self.tab_bar_height,
            adjustment: ClampAdjustment::Squeezed,
        }
    }

    /// An app reverted our position write beyond tolerance.
    pub fn needs_position_retry(&self, expected: &Rect, live: &Rect) -> bool {
        (live.y - expected.y).abs() > self.position_tolerance
            || (live.x - expected.x).abs() > self.position_tolerance
    }

    /// A live frame matches a frame we wrote ourselves.
    pub fn is_frame_echo(&self, expected: &Rect, live: &Rect) -> bool {
        expected.edges_within(live, self.echo_tolerance)
    }

    /// The frame fills the visible area, with or without the tab bar strip.
    pub fn is_maximized(&self, frame: &Rect, visible: &Rect) -> bool {
        let tolerance = self.echo_tolerance;
        let full_width = (frame.x - visible.x).abs() <= tolerance
            && (frame.max_x() - visible.max_x()).abs() <= tolerance;
        let reaches_bottom = (frame.max_y() - visible.max_y()).abs() <= tolerance;
        let starts_at_top = (frame.y - visible.y).abs() <= tolerance
            || (frame.y - (visible.y + self.tab_bar_height)).abs() <= tolerance;
        full_width && reaches_bottom && starts_at_top
    }

    /// Strip above `frame` where the tab bar sits.
    pub fn tab_bar_frame(&self, frame: &Rect) -> Rect {
        Rect::new(
            frame.x,
            frame.y - self.tab_bar_height,
            frame.width,
            self.tab_bar_height,
        )
    }

    /// Members that follow a frame change of `source`.
    pub fn mirror_targets(&self, group: &Group, source: WindowId) -> Vec<WindowId> {
        group
            .managed_windows()
            .filter(|w| w.id != source && !w.is_fullscreen)
            .map(|w| w.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::test_helpers::group_of;

    fn reconciler() -> FrameReconciler {
        FrameReconciler::new(30.0, 4.0, 2.0)
    }

    fn visible() -> Rect {
        Rect::new(0.0, 0.0, 1440.0, 1000.0)
    }

    #[test]
    fn test_first_clamp_squeezes_then_second_only_repositions() {
        let frames = reconciler();
        let frame = Rect::new(0.0, 0.0, 800.0, 800.0);

        let first = frames.clamp(frame, visible(), 0.0);
        assert_eq!(first.adjustment, ClampAdjustment::Squeezed);
        assert_eq!(first.frame, Rect::new(0.0, 30.0, 800.0, 770.0));
        assert_eq!(first.squeeze_delta, 30.0);

        let second = frames.clamp(frame, visible(), first.squeeze_delta);
        assert_eq!(second.adjustment, ClampAdjustment::Repositioned);
        assert_eq!(second.frame, Rect::new(0.0, 30.0, 800.0, 800.0));
        assert_eq!(second.squeeze_delta, 30.0);
    }

    #[test]
    fn test_repeated_clamps_never_grow_delta() {
        let frames = reconciler();
        let mut frame = Rect::new(10.0, 5.0, 600.0, 900.0);
        let mut delta = 0.0;
        for _ in 0..5 {
            let out = frames.clamp(frame, visible(), delta);
            assert!(out.squeeze_delta <= frames.tab_bar_height);
            assert!(out.squeeze_delta >= delta);
            delta = out.squeeze_delta;
            frame = out.frame;
        }
        assert_eq!(delta, 30.0);
        assert_eq!(frame.height, 870.0);
    }

    #[test]
    fn test_frame_below_tab_bar_is_unchanged() {
        let frames = reconciler();
        let frame = Rect::new(100.0, 200.0, 500.0, 400.0);
        let out = frames.clamp(frame, visible(), 0.0);
        assert!(!out.changed());
        assert_eq!(out.frame, frame);
        assert_eq!(out.squeeze_delta, 0.0);
    }

    #[test]
    fn test_squeeze_keeps_positive_height() {
        let frames = reconciler();
        let out = frames.clamp(Rect::new(0.0, 0.0, 300.0, 20.0), visible(), 0.0);
        assert_eq!(out.frame.height, 1.0);
    }

    #[test]
    fn test_position_retry_tolerance() {
        let frames = reconciler();
        let expected = Rect::new(0.0, 30.0, 800.0, 770.0);
        assert!(!frames.needs_position_retry(&expected, &Rect::new(0.0, 33.0, 800.0, 770.0)));
        assert!(frames.needs_position_retry(&expected, &Rect::new(0.0, 0.0, 800.0, 770.0)));
    }

    #[test]
    fn test_is_maximized_accepts_squeezed_full_screen_frame() {
        let frames = reconciler();
        assert!(frames.is_maximized(&Rect::new(0.0, 30.0, 1440.0, 970.0), &visible()));
        assert!(frames.is_maximized(&visible(), &visible()));
        assert!(!frames.is_maximized(&Rect::new(0.0, 30.0, 800.0, 970.0), &visible()));
    }

    #[test]
    fn test_mirror_targets_skip_source_and_fullscreen() {
        let frames = reconciler();
        let mut group = group_of(&[1, 2, 3]);
        group.window_mut(WindowId(3)).unwrap().is_fullscreen = true;
        assert_eq!(frames.mirror_targets(&group, WindowId(1)), vec![WindowId(2)]);
    }

    #[test]
    fn test_tab_bar_frame_sits_above_group_frame() {
        let frames = reconciler();
        let bar = frames.tab_bar_frame(&Rect::new(0.0, 30.0, 800.0, 770.0));
        assert_eq!(bar, Rect::new(0.0, 0.0, 800.0, 30.0));
    }
}
