use crossterm::event::{KeyCode, KeyEvent};
use indexmap::IndexMap;

use crate::matcher::{self, FieldKind};

use super::{
    error::FormError,
    field::{FieldRef, ViewField},
    hidden_list::HiddenList,
    views::ViewId,
};

pub const DUPLICATE_PATH: &str = " This path already exists";

/// The two per-view multi-value path lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionKind {
    Artifacts,
    VersionFiles,
}

impl SelectionKind {
    /// Name of the persisted hidden field the box mirrors into.
    pub fn hidden_name(self) -> &'static str {
        match self {
            SelectionKind::Artifacts => "artifacts",
            SelectionKind::VersionFiles => "versionFiles",
        }
    }

    pub fn input_field(self) -> ViewField {
        match self {
            SelectionKind::Artifacts => ViewField::PathToArtifacts,
            SelectionKind::VersionFiles => ViewField::VersionFilesPath,
        }
    }

    pub fn field_kind(self) -> FieldKind {
        match self {
            SelectionKind::Artifacts => FieldKind::Artifact,
            SelectionKind::VersionFiles => FieldKind::VersionFile,
        }
    }
}

/// Visible option list bound to a hidden `;`-joined field of one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionBox {
    owner: ViewId,
    kind: SelectionKind,
    options: Vec<String>,
    selected: Option<usize>,
    hidden: HiddenList,
    pub visible: bool,
    pub error: Option<String>,
}

impl SelectionBox {
    pub fn new(owner: ViewId, kind: SelectionKind) -> Self {
        Self {
            owner,
            kind,
            options: Vec::new(),
            selected: None,
            hidden: HiddenList::new(),
            visible: true,
            error: None,
        }
    }

    pub fn from_entries(owner: ViewId, kind: SelectionKind, entries: &[String]) -> Self {
        let mut selection = Self::new(owner, kind);
        for entry in entries {
            if !selection.contains(entry) {
                selection.options.push(entry.clone());
                selection.hidden.push(entry);
            }
        }
        selection
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn hidden(&self) -> &HiddenList {
        &self.hidden
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.options.get(idx))
            .map(String::as_str)
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.options.iter().any(|option| option == candidate)
    }

    fn field_ref(&self) -> FieldRef {
        FieldRef::View {
            view: self.owner,
            field: self.kind.input_field(),
        }
    }

    /// Append `candidate` unless it is empty, fails its path rule, or is
    /// already listed. A rejected add keeps the inline error visible.
    pub fn add_entry(&mut self, candidate: &str) -> Result<(), FormError> {
        if candidate.is_empty() {
            return Err(FormError::validation(self.field_ref(), "empty path"));
        }
        if let Err(message) = matcher::check(self.kind.field_kind(), candidate) {
            self.error = Some(message.to_string());
            return Err(FormError::validation(self.field_ref(), message));
        }
        if self.contains(candidate) {
            self.error = Some(DUPLICATE_PATH.to_string());
            return Err(FormError::DuplicateEntry {
                field: self.field_ref(),
                value: candidate.to_string(),
            });
        }
        self.options.push(candidate.to_string());
        self.hidden.push(candidate);
        self.error = None;
        tracing::debug!(
            view = %self.owner.dom_id(),
            field = self.kind.hidden_name(),
            hidden = self.hidden.as_str(),
            "selection entry added"
        );
        Ok(())
    }

    pub fn select(&mut self, delta: i32) -> bool {
        if self.options.is_empty() {
            return false;
        }
        let len = self.options.len() as i32;
        let next = match self.selected {
            Some(current) => (current as i32 + delta).clamp(0, len - 1),
            None if delta < 0 => len - 1,
            None => 0,
        } as usize;
        let changed = self.selected != Some(next);
        self.selected = Some(next);
        changed
    }

    pub fn select_value(&mut self, value: &str) -> bool {
        match self.options.iter().position(|option| option == value) {
            Some(idx) => {
                self.selected = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Drop the highlighted option and its hidden-field entry.
    pub fn remove_selected(&mut self) -> Option<String> {
        let idx = self.selected?;
        if idx >= self.options.len() {
            self.selected = None;
            return None;
        }
        let removed = self.options.remove(idx);
        self.hidden.remove(&removed);
        self.selected = if self.options.is_empty() {
            None
        } else {
            Some(idx.min(self.options.len() - 1))
        };
        tracing::debug!(
            view = %self.owner.dom_id(),
            field = self.kind.hidden_name(),
            hidden = self.hidden.as_str(),
            "selection entry removed"
        );
        Some(removed)
    }

    /// Arrow keys move the highlight; only `delete_key` removes, and only
    /// while an option is highlighted.
    pub fn handle_key(&mut self, key: &KeyEvent, delete_key: KeyCode) -> bool {
        match key.code {
            KeyCode::Up => self.select(-1),
            KeyCode::Down => self.select(1),
            code if code == delete_key => self.remove_selected().is_some(),
            _ => false,
        }
    }

    /// Show or hide the box. Either way the list starts over empty.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.hidden.clear();
        self.options.clear();
        self.selected = None;
        self.error = None;
        self.visible = enabled;
    }
}

/// Build-machine checkboxes mirrored into the page-global
/// `build_machine_configuration` hidden field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineSelection {
    nodes: IndexMap<String, bool>,
    hidden: HiddenList,
}

impl MachineSelection {
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(|node| (node.into(), false)).collect(),
            hidden: HiddenList::new(),
        }
    }

    pub fn toggle(&mut self, node: &str, checked: bool) {
        let entry = self.nodes.entry(node.to_string()).or_insert(false);
        if *entry == checked {
            return;
        }
        *entry = checked;
        if checked {
            self.hidden.push(node);
        } else {
            self.hidden.remove(node);
        }
    }

    /// Reset every box, then check the nodes the record marks as selected.
    pub fn load(&mut self, selection: &IndexMap<String, bool>) {
        self.hidden.clear();
        for checked in self.nodes.values_mut() {
            *checked = false;
        }
        for (node, selected) in selection {
            if *selected {
                self.nodes.insert(node.clone(), true);
                self.hidden.push(node);
            } else {
                self.nodes.entry(node.clone()).or_insert(false);
            }
        }
    }

    pub fn is_checked(&self, node: &str) -> bool {
        self.nodes.get(node).copied().unwrap_or(false)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, bool)> {
        self.nodes.iter().map(|(node, checked)| (node.as_str(), *checked))
    }

    pub fn hidden(&self) -> &HiddenList {
        &self.hidden
    }

    pub fn to_map(&self) -> IndexMap<String, bool> {
        self.nodes.clone()
    }
}
