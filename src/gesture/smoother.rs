use std::collections::VecDeque;

/// Majority vote over the last `capacity` raw motion-gesture ids.
pub struct GestureSmoother {
    capacity: usize,
    history: VecDeque<usize>,
}

impl GestureSmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, id: usize) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(id);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Most frequent id in the window. Ties go to the id seen first in the
    /// window, not to the smallest one. An empty window resolves to 0.
    pub fn resolve(&self) -> usize {
        // (id, count) in first-seen order.
        let mut counts: Vec<(usize, usize)> = Vec::new();
        for &id in &self.history {
            match counts.iter_mut().find(|(seen, _)| *seen == id) {
                Some((_, count)) => *count += 1,
                None => counts.push((id, 1)),
            }
        }

        let mut best: Option<(usize, usize)> = None;
        for (id, count) in counts {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((id, count));
            }
        }
        best.map(|(id, _)| id).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_window_resolves_to_its_id() {
        let mut smoother = GestureSmoother::new(16);
        for _ in 0..16 {
            smoother.push(3);
        }
        assert_eq!(smoother.resolve(), 3);
    }

    #[test]
    fn plurality_wins_regardless_of_position() {
        let mut smoother = GestureSmoother::new(6);
        for id in [1, 2, 2, 0, 2, 1] {
            smoother.push(id);
        }
        assert_eq!(smoother.resolve(), 2);

        let mut smoother = GestureSmoother::new(6);
        for id in [2, 2, 2, 1, 0, 1] {
            smoother.push(id);
        }
        assert_eq!(smoother.resolve(), 2);
    }

    #[test]
    fn tie_goes_to_first_seen() {
        let mut smoother = GestureSmoother::new(4);
        for id in [3, 1, 1, 3] {
            smoother.push(id);
        }
        assert_eq!(smoother.resolve(), 3);
    }

    #[test]
    fn evicts_oldest() {
        let mut smoother = GestureSmoother::new(3);
        for id in [7, 7, 7, 4, 4] {
            smoother.push(id);
        }
        assert_eq!(smoother.len(), 3);
        assert_eq!(smoother.resolve(), 4);
    }

    #[test]
    fn out_of_range_ids_are_still_counted() {
        let mut smoother = GestureSmoother::new(3);
        for id in [99, 99, 1] {
            smoother.push(id);
        }
        assert_eq!(smoother.resolve(), 99);
    }

    #[test]
    fn empty_window_means_no_gesture() {
        assert_eq!(GestureSmoother::new(8).resolve(), 0);
    }
}
