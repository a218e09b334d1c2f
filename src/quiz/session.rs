use std::collections::HashMap;

/// What the user has done with one rendered question instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_key: Option<String>,
    /// Only meaningful after a wrong answer; cleared whenever the selection changes.
    pub explanation_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Changed,
    Unchanged,
}

/// Selection state of every question instance in one view, keyed by instance key.
///
/// Owned by the view that renders the questions and dropped with it, so
/// nothing here outlives a chapter being open.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    selections: HashMap<String, SelectionState>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly rendered instance with nothing selected.
    pub fn track(&mut self, instance_key: &str) {
        self.selections
            .insert(instance_key.to_string(), SelectionState::default());
    }

    pub fn forget(&mut self, instance_key: &str) {
        self.selections.remove(instance_key);
    }

    pub fn state(&self, instance_key: &str) -> Option<&SelectionState> {
        self.selections.get(instance_key)
    }

    /// Records a selection; picking the option that is already selected does nothing.
    pub fn select(&mut self, instance_key: &str, key: &str) -> SelectionChange {
        let state = self.selections.entry(instance_key.to_string()).or_default();
        if state.selected_key.as_deref() == Some(key) {
            return SelectionChange::Unchanged;
        }
        state.selected_key = Some(key.to_string());
        state.explanation_open = false;
        SelectionChange::Changed
    }

    /// Opens the explanation region of the current selection.
    pub fn expand(&mut self, instance_key: &str) -> SelectionChange {
        match self.selections.get_mut(instance_key) {
            Some(state) if state.selected_key.is_some() && !state.explanation_open => {
                state.explanation_open = true;
                SelectionChange::Changed
            }
            _ => SelectionChange::Unchanged,
        }
    }
}
