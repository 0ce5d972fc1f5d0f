/// Non-empty list with a wrapping cursor.
#[derive(Debug)]
pub struct Cycle<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Cycle<T> {
    /// `None` when `items` is empty.
    pub fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self { items, index: 0 })
    }

    pub fn current(&self) -> &T {
        &self.items[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Advances, wrapping from the last item to the first.
    pub fn next(&mut self) -> &T {
        self.index = (self.index + 1) % self.items.len();
        self.current()
    }

    /// Steps back, wrapping from the first item to the last.
    pub fn prev(&mut self) -> &T {
        self.index = match self.index {
            0 => self.items.len() - 1,
            i => i - 1,
        };
        self.current()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_rejected() {
        assert!(Cycle::<u8>::new(Vec::new()).is_none());
    }

    #[test]
    fn n_steps_forward_return_to_start() {
        for n in 1..=5 {
            let mut c = Cycle::new((0..n).collect()).unwrap();
            c.next();
            let start = c.index();
            for _ in 0..n {
                c.next();
            }
            assert_eq!(c.index(), start);
        }
    }

    #[test]
    fn prev_from_first_wraps_to_last() {
        let mut c = Cycle::new(vec!['a', 'b', 'c']).unwrap();
        assert_eq!(*c.prev(), 'c');
        assert_eq!(c.index(), 2);
        assert_eq!(*c.prev(), 'b');
    }

    #[test]
    fn single_item_stays_put() {
        let mut c = Cycle::new(vec![7]).unwrap();
        assert_eq!(*c.next(), 7);
        assert_eq!(*c.prev(), 7);
        assert_eq!(c.index(), 0);
    }
}
