//! Session notes: free-text reminders kept alongside conversions.

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: u64,
    pub text: String,
}

/// Free-text notes kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct NotesStore {
    notes: Vec<Note>,
    next_id: u64,
}

impl NotesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a note unless `text` is blank. The text is stored as given.
    pub fn add(&mut self, text: &str) -> Option<&Note> {
        if text.trim().is_empty() {
            debug!("Ignoring blank note");
            return None;
        }

        self.next_id += 1;
        self.notes.push(Note {
            id: self.next_id,
            text: text.to_string(),
        });
        self.notes.last()
    }

    /// Removes the note with `id`, returning it. Unknown ids are ignored.
    pub fn remove(&mut self, id: u64) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(index))
    }

    pub fn get(&self, id: u64) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
