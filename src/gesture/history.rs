use std::collections::VecDeque;

use crate::types::Point;

pub const DEFAULT_HISTORY_LEN: usize = 16;
pub const NO_POINT: Point = (0, 0);

/// Sliding window over the tracked fingertip, used as motion classifier input.
///
/// The window holds at most `capacity` points, oldest first. Frames without
/// a tracked point contribute [`NO_POINT`]. A change of frame size is treated
/// as a discontinuity and restarts the window, since the exported features are
/// relative to the frame dimensions.
pub struct PointHistory {
    capacity: usize,
    points: VecDeque<Point>,
    frame_size: Option<(u32, u32)>,
}

impl PointHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
            frame_size: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True once `capacity` observations arrived since the last discontinuity.
    pub fn is_ready(&self) -> bool {
        self.points.len() == self.capacity
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn observe(&mut self, point: Option<Point>, frame_width: u32, frame_height: u32) {
        let size = (frame_width, frame_height);
        if self.frame_size != Some(size) {
            if self.frame_size.is_some() {
                log::debug!(
                    "frame size changed to {frame_width}x{frame_height}, restarting point history"
                );
            }
            self.points.clear();
            self.frame_size = Some(size);
        }

        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point.unwrap_or(NO_POINT));
    }

    /// Flattened `[x0, y0, x1, y1, ...]` relative to the oldest point, with x
    /// scaled by the frame width and y by the frame height.
    ///
    /// The result has `2 * len()` entries; only a ready window (`2 * capacity`)
    /// is meaningful to the motion classifier.
    pub fn export_features(&self) -> Vec<f32> {
        let Some(&(base_x, base_y)) = self.points.front() else {
            return Vec::new();
        };
        let (width, height) = self.frame_size.unwrap_or((1, 1));
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;

        let mut result = Vec::with_capacity(self.points.len() * 2);
        for &(x, y) in &self.points {
            result.push((x - base_x) as f32 / width);
            result.push((y - base_y) as f32 / height);
        }
        result
    }
}

impl Default for PointHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_capacity_and_keeps_latest_in_order() {
        let mut history = PointHistory::new(4);
        for i in 0..10 {
            history.observe(Some((i, i * 2)), 640, 480);
            assert!(history.len() <= 4);
        }
        let pts: Vec<Point> = history.points().collect();
        assert_eq!(pts, vec![(6, 12), (7, 14), (8, 16), (9, 18)]);
        assert!(history.is_ready());
    }

    #[test]
    fn missing_point_records_sentinel() {
        let mut history = PointHistory::new(3);
        history.observe(Some((5, 5)), 100, 100);
        history.observe(None, 100, 100);
        let pts: Vec<Point> = history.points().collect();
        assert_eq!(pts, vec![(5, 5), NO_POINT]);
    }

    #[test]
    fn partial_window_is_not_ready() {
        let mut history = PointHistory::default();
        for _ in 0..5 {
            history.observe(Some((10, 10)), 640, 480);
        }
        assert!(!history.is_ready());
        assert_eq!(history.export_features().len(), 10);
    }

    #[test]
    fn features_are_relative_to_first_point_and_frame_size() {
        let mut history = PointHistory::new(3);
        history.observe(Some((100, 100)), 200, 400);
        history.observe(Some((150, 100)), 200, 400);
        history.observe(Some((100, 300)), 200, 400);
        assert_eq!(
            history.export_features(),
            vec![0.0, 0.0, 0.25, 0.0, 0.0, 0.5]
        );
    }

    #[test]
    fn frame_resize_restarts_window() {
        let mut history = PointHistory::new(3);
        history.observe(Some((1, 1)), 640, 480);
        history.observe(Some((2, 2)), 640, 480);
        history.observe(Some((3, 3)), 1280, 720);
        let pts: Vec<Point> = history.points().collect();
        assert_eq!(pts, vec![(3, 3)]);
    }

    #[test]
    fn empty_history_exports_nothing() {
        assert!(PointHistory::new(8).export_features().is_empty());
    }
}
