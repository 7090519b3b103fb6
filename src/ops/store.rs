use indexmap::IndexMap;

use crate::model::{Note, NoteContext};

/// Prefix stripped from table sources when building group labels
const TABLE_PREFIX: &str = "table_";

/// Client-side cache of the notes for the current context.
///
/// Never talks to the service. Every write is followed by a full reload,
/// so the only mutation is a wholesale replace.
#[derive(Debug, Default)]
pub struct NoteStore {
    context: Option<NoteContext>,
    notes: Vec<Note>,
}

/// Notes sharing a `table_source`, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGroup<'a> {
    pub table_source: &'a str,
    pub label: String,
    pub notes: Vec<&'a Note>,
}

impl NoteGroup<'_> {
    /// Header text, e.g. `SALES (3)`
    pub fn header(&self) -> String {
        format!("{} ({})", self.label, self.notes.len())
    }
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_context(&mut self, context: NoteContext) {
        self.context = Some(context);
    }

    pub fn context(&self) -> Option<&NoteContext> {
        self.context.as_ref()
    }

    /// Replace the cached notes. Nothing from earlier calls survives.
    pub fn replace_all(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    pub fn all(&self) -> &[Note] {
        &self.notes
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Partition notes by `table_source`, keeping server order within each group
    pub fn groups(&self) -> Vec<NoteGroup<'_>> {
        let mut grouped: IndexMap<&str, Vec<&Note>> = IndexMap::new();
        for note in &self.notes {
            grouped.entry(note.table_source.as_str()).or_default().push(note);
        }
        grouped
            .into_iter()
            .map(|(table_source, notes)| NoteGroup {
                table_source,
                label: group_label(table_source),
                notes,
            })
            .collect()
    }
}

/// Human-readable label for a table source: `table_sales` -> `SALES`
pub fn group_label(table_source: &str) -> String {
    table_source
        .strip_prefix(TABLE_PREFIX)
        .unwrap_or(table_source)
        .to_uppercase()
}
