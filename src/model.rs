use rand::{distributions::Alphanumeric, Rng};
use std::collections::HashMap;

pub type NoteId = String;

/// A short text note attached to one calendar day. `date` is the
/// canonical `YYYY-MM-DD` key of the bucket holding the note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub date: String,
    pub title: String,
}

/// Date-keyed note collection. Every operation is copy-on-write: the
/// receiver is left untouched and a new store is returned, so the
/// session can install the result atomically.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    buckets: HashMap<String, Vec<Note>>,
}

impl NoteStore {
    pub fn new() -> Self {
        NoteStore::default()
    }

    /// Creates a note, or re-homes an existing one when `editing` is set.
    ///
    /// An edited note is removed from whichever bucket holds it and a
    /// rebuilt note with the same id is appended to `date`'s bucket.
    /// That holds even when the date is unchanged, so a re-saved note
    /// moves to the end of its bucket. Neither `date` nor `title` is
    /// validated; a malformed date yields a bucket no rendered cell
    /// ever matches.
    pub fn add_or_update(&self, editing: Option<&NoteId>, date: &str, title: &str) -> NoteStore {
        let mut next = self.clone();
        let id = match editing {
            Some(id) => {
                for bucket in next.buckets.values_mut() {
                    bucket.retain(|note| &note.id != id);
                }
                id.clone()
            }
            None => generate_id(),
        };
        next.buckets
            .entry(date.to_string())
            .or_default()
            .push(Note {
                id,
                date: date.to_string(),
                title: title.to_string(),
            });
        next
    }

    pub fn remove(&self, id: &str) -> NoteStore {
        let mut next = self.clone();
        for bucket in next.buckets.values_mut() {
            bucket.retain(|note| note.id != id);
        }
        next
    }

    /// Notes for one day in insertion order; empty for unknown keys.
    pub fn notes_for(&self, key: &str) -> &[Note] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, id: &str) -> Option<&Note> {
        self.buckets.values().flatten().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_appends_to_the_date_bucket() {
        let store = NoteStore::new().add_or_update(None, "2024-03-05", "Demo");
        let notes = store.notes_for("2024-03-05");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].date, "2024-03-05");
        assert_eq!(notes[0].title, "Demo");
        assert_eq!(notes[0].id.len(), 6);
    }

    #[test]
    fn unknown_key_is_empty_not_a_panic() {
        let store = NoteStore::new();
        assert!(store.notes_for("2024-03-05").is_empty());
        assert!(store.notes_for("not a date").is_empty());
    }

    #[test]
    fn edit_moves_the_note_between_buckets() {
        let store = NoteStore::new().add_or_update(None, "2024-03-05", "Demo");
        let id = store.notes_for("2024-03-05")[0].id.clone();

        let moved = store.add_or_update(Some(&id), "2024-03-06", "Demo");
        assert!(moved.notes_for("2024-03-05").is_empty());
        let notes = moved.notes_for("2024-03-06");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, id);
        assert_eq!(notes[0].date, "2024-03-06");
    }

    #[test]
    fn resave_on_same_date_moves_note_to_the_end() {
        let store = NoteStore::new()
            .add_or_update(None, "2024-03-05", "first")
            .add_or_update(None, "2024-03-05", "second");
        let first_id = store.notes_for("2024-03-05")[0].id.clone();

        let resaved = store.add_or_update(Some(&first_id), "2024-03-05", "first again");
        let notes = resaved.notes_for("2024-03-05");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].title, "second");
        assert_eq!(notes[1].title, "first again");
        assert_eq!(notes[1].id, first_id);
    }

    #[test]
    fn store_is_copy_on_write() {
        let store = NoteStore::new().add_or_update(None, "2024-03-05", "Demo");
        let id = store.notes_for("2024-03-05")[0].id.clone();

        let _ = store.add_or_update(Some(&id), "2024-03-06", "Demo");
        let _ = store.remove(&id);
        assert_eq!(store.notes_for("2024-03-05").len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn identical_content_stays_distinct() {
        let store = NoteStore::new()
            .add_or_update(None, "2024-03-05", "Demo")
            .add_or_update(None, "2024-03-05", "Demo");
        let notes = store.notes_for("2024-03-05");
        assert_eq!(notes.len(), 2);
        assert_ne!(notes[0].id, notes[1].id);

        let first_id = notes[0].id.clone();
        let trimmed = store.remove(&first_id);
        assert_eq!(trimmed.notes_for("2024-03-05").len(), 1);
    }

    #[test]
    fn remove_deletes_only_the_identified_note() {
        let store = NoteStore::new()
            .add_or_update(None, "2024-03-05", "keep")
            .add_or_update(None, "2024-03-06", "drop");
        let id = store.notes_for("2024-03-06")[0].id.clone();

        let next = store.remove(&id);
        assert_eq!(next.notes_for("2024-03-05").len(), 1);
        assert!(next.notes_for("2024-03-06").is_empty());
        assert!(next.find(&id).is_none());
    }

    #[test]
    fn find_resolves_ids_across_buckets() {
        let store = NoteStore::new()
            .add_or_update(None, "2024-03-05", "a")
            .add_or_update(None, "2024-04-01", "b");
        let id = store.notes_for("2024-04-01")[0].id.clone();
        assert_eq!(store.find(&id).unwrap().title, "b");
        assert!(store.find("zzzzzz").is_none());
    }

    #[test]
    fn empty_titles_and_odd_dates_pass_through() {
        let store = NoteStore::new().add_or_update(None, "soon-ish", "");
        assert_eq!(store.notes_for("soon-ish")[0].title, "");
        assert_eq!(store.len(), 1);
    }
}
