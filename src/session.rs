use chrono::NaiveDate;
use log::debug;

use crate::grid::{self, Cell};
use crate::model::{NoteId, NoteStore};

/// Transient edit-form fields, alive only while the editor is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub date: String,
}

/// Modal editor state. Holding the draft inside the open variants keeps
/// "editor open without a draft" unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editor {
    Closed,
    Creating(Draft),
    Editing { id: NoteId, draft: Draft },
}

/// The whole calendar session: displayed month, selection, notes and
/// editor state, updated through one method per transition. Handlers
/// run to completion, so every event sees a consistent snapshot.
#[derive(Debug, Clone)]
pub struct Session {
    current_month: NaiveDate,
    selected_date: NaiveDate,
    notes: NoteStore,
    editor: Editor,
}

impl Session {
    pub fn new(today: NaiveDate) -> Self {
        Session {
            current_month: today,
            selected_date: today,
            notes: NoteStore::new(),
            editor: Editor::Closed,
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
    }

    /// Moves the displayed month; the selection stays put even when it
    /// falls outside the new month.
    pub fn change_month(&mut self, delta: i32) {
        self.current_month = grid::advance_month(self.current_month, delta);
        debug!("showing {}", grid::month_label(self.current_month));
    }

    pub fn open_new(&mut self) {
        if self.editor != Editor::Closed {
            return;
        }
        self.editor = Editor::Creating(Draft {
            title: String::new(),
            date: self.selected_key(),
        });
    }

    /// Opens the editor on an existing note; unknown ids are ignored.
    pub fn open_existing(&mut self, id: &str) {
        if self.editor != Editor::Closed {
            return;
        }
        if let Some(note) = self.notes.find(id) {
            self.editor = Editor::Editing {
                id: note.id.clone(),
                draft: Draft {
                    title: note.title.clone(),
                    date: note.date.clone(),
                },
            };
        }
    }

    pub fn edit_title(&mut self, text: &str) {
        if let Some(draft) = self.draft_mut() {
            draft.title = text.to_string();
        }
    }

    pub fn edit_date(&mut self, text: &str) {
        if let Some(draft) = self.draft_mut() {
            draft.date = text.to_string();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editor = Editor::Closed;
    }

    /// Commits the open draft to the note store and closes the editor.
    pub fn save_edit(&mut self) {
        let editor = std::mem::replace(&mut self.editor, Editor::Closed);
        let (editing, draft) = match editor {
            Editor::Closed => return,
            Editor::Creating(draft) => (None, draft),
            Editor::Editing { id, draft } => (Some(id), draft),
        };
        self.notes = self
            .notes
            .add_or_update(editing.as_ref(), &draft.date, &draft.title);
        debug!("saved note on {}", draft.date);
    }

    pub fn delete_note(&mut self, id: &str) {
        self.notes = self.notes.remove(id);
        debug!("deleted note {}", id);
    }

    fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.editor {
            Editor::Closed => None,
            Editor::Creating(draft) => Some(draft),
            Editor::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn cells(&self) -> Vec<Vec<Cell>> {
        grid::month_cells(self.current_month)
    }

    pub fn month_label(&self) -> String {
        grid::month_label(self.current_month)
    }

    pub fn current_month(&self) -> NaiveDate {
        self.current_month
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn selected_key(&self) -> String {
        grid::date_key(self.selected_date)
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }
}
