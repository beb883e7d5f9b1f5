use std::fmt;

use factload_result::{Error, Result};

/// Position of a fact writer in its single-pass lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactWriterState {
    Created,
    Initialised,
    Writing,
    Finished,
    Closed,
}

impl FactWriterState {
    /// Whether the lifecycle allows moving from `self` to `to`.
    ///
    /// `close` is reachable from every open state so a writer whose unit
    /// failed part way still releases its resources.
    pub fn can_transition(self, to: FactWriterState) -> bool {
        use FactWriterState::*;
        matches!(
            (self, to),
            (Created, Initialised)
                | (Initialised | Writing, Writing)
                | (Initialised | Writing, Finished)
                | (Created | Initialised | Writing | Finished, Closed)
        )
    }

    /// Move to `to`, or fail with an internal error naming `owner`.
    pub fn transition(&mut self, to: FactWriterState, owner: impl fmt::Display) -> Result<()> {
        if !self.can_transition(to) {
            return Err(Error::Internal(format!(
                "fact writer for {owner} cannot move from {self:?} to {to:?}"
            )));
        }
        *self = to;
        Ok(())
    }

    pub fn is_closed(self) -> bool {
        self == FactWriterState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::FactWriterState::*;
    use super::*;

    #[test]
    fn happy_path() {
        let mut s = Created;
        for to in [Initialised, Writing, Writing, Finished, Closed] {
            s.transition(to, "unit").unwrap();
        }
        assert!(s.is_closed());
    }

    #[test]
    fn empty_batch_skips_writing() {
        let mut s = Created;
        s.transition(Initialised, "unit").unwrap();
        s.transition(Finished, "unit").unwrap();
        s.transition(Closed, "unit").unwrap();
    }

    #[test]
    fn closed_is_terminal() {
        for to in [Created, Initialised, Writing, Finished, Closed] {
            assert!(!Closed.can_transition(to), "Closed -> {to:?}");
        }
    }

    #[test]
    fn rows_require_initialise() {
        let mut s = Created;
        let err = s.transition(Writing, "partition 0 batch 1").unwrap_err();
        assert!(err.to_string().contains("partition 0 batch 1"));
        assert_eq!(s, Created);
    }

    #[test]
    fn finished_accepts_only_close() {
        assert!(!Finished.can_transition(Writing));
        assert!(!Finished.can_transition(Finished));
        assert!(Finished.can_transition(Closed));
    }
}
