//! Last-seen position in one paginated listing stream.
//!
//! Single writer (the pager). Advancing with `None` marks the stream
//! exhausted; `current()` then stays `None` until an explicit `reset()`
//! starts a fresh pass. A cursor is never rolled back.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    /// Before the first page of a pass.
    Start,
    At(String),
    /// The source returned a terminal marker.
    End,
}

#[derive(Debug, Clone)]
pub struct CursorStore {
    pos: Position,
}

impl Default for CursorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorStore {
    pub fn new() -> Self {
        Self {
            pos: Position::Start,
        }
    }

    pub fn current(&self) -> Option<&str> {
        match &self.pos {
            Position::At(cursor) => Some(cursor),
            Position::Start | Position::End => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos == Position::End
    }

    pub fn advance(&mut self, next: Option<String>) {
        self.pos = match next {
            Some(cursor) => Position::At(cursor),
            None => Position::End,
        };
    }

    /// Begin a new pass over the source from the top of the sequence.
    pub fn reset(&mut self) {
        self.pos = Position::Start;
    }
}
