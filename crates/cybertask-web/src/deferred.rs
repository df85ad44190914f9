use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Snapshots waiting to be handed to a JS listener once the current export
/// call has returned and released its borrow of [`crate::CyberTask`].
#[derive(Debug)]
pub struct Deferred<T> {
  queue: Rc<RefCell<VecDeque<T>>>
}

impl<T> Default for Deferred<T> {
  fn default() -> Self {
    Self {
      queue: Rc::default()
    }
  }
}

impl<T> Clone for Deferred<T> {
  fn clone(&self) -> Self {
    Self {
      queue: Rc::clone(&self.queue)
    }
  }
}

impl<T> Deferred<T> {
  /// Queues a snapshot. Returns true when
  /// the queue was idle and a flush has to
  /// be scheduled.
  pub fn push(
    &self,
    item: T
  ) -> bool {
    let mut queue =
      self.queue.borrow_mut();
    queue.push_back(item);
    queue.len() == 1
  }

  pub fn drain(&self) -> Vec<T> {
    self
      .queue
      .borrow_mut()
      .drain(..)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::Deferred;

  #[test]
  fn schedules_once_per_batch() {
    let pending = Deferred::default();
    let flusher = pending.clone();

    assert!(pending.push("add"));
    assert!(!pending.push("toggle"));
    assert_eq!(
      flusher.drain(),
      ["add", "toggle"]
    );

    assert!(pending.push("delete"));
    assert_eq!(
      flusher.drain(),
      ["delete"]
    );
    assert!(flusher.drain().is_empty());
  }
}
