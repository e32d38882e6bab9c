use std::collections::VecDeque;

/// Default number of alerts kept on screen.
pub const DEFAULT_ALERT_CAPACITY: usize = 50;

/// Fixed-capacity, newest-first buffer.
///
/// Every insert goes to the front; once `capacity` is reached the oldest
/// entry falls off the back. `len() <= capacity()` holds after every call.
#[derive(Debug, Clone)]
pub struct AlertBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> AlertBuffer<T> {
    /// A capacity of zero is raised to one so the buffer can always show
    /// the latest entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend `item`, returning the entry evicted from the tail if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Newest entry.
    pub fn latest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.items.iter()
    }
}

impl<T> Default for AlertBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_prepends_and_evicts_oldest() {
        let mut buf = AlertBuffer::new(3);
        assert_eq!(buf.push(1), None);
        assert_eq!(buf.push(2), None);
        assert_eq!(buf.push(3), None);
        assert_eq!(buf.push(4), Some(1));
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![4, 3, 2]);
        assert_eq!(buf.latest(), Some(&4));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut buf = AlertBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
        buf.push("a");
        assert_eq!(buf.push("b"), Some("a"));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn default_capacity_is_fifty() {
        let buf: AlertBuffer<u8> = AlertBuffer::default();
        assert_eq!(buf.capacity(), 50);
        assert!(buf.is_empty());
    }
}
