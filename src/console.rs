//! The payment methods console: the surface the surrounding UI drives.
//!
//! Owns the registry, the add/edit dialog state, and the pending-removal
//! confirmation. Also processes scripted operations from CSV and writes
//! the normalized list back out, one record per row.

use crate::editor::{EditorState, MethodFormState};
use crate::error::Result;
use crate::method::{MethodType, PaymentMethod};
use crate::normalize::display_label;
use crate::ops::{FieldInput, Op, OpRecord};
use crate::registry::{MethodEvents, MethodRegistry};
use chrono::{Datelike, Utc};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::io::{Read, Write};
use std::mem;

/// Drives one payment-methods card: list, dialogs, removal confirmation.
///
/// All mutations are synchronous in-memory replacements; the only
/// asynchrony at the boundary is the fire-and-forget notification sink
/// held by the registry. Canceling a dialog is always safe because the
/// staged form is fully disjoint from the registry until submit.
pub struct MethodConsole {
    registry: MethodRegistry,
    editor: EditorState,

    /// Id awaiting removal confirmation, if any.
    pending_removal: Option<String>,
}

impl MethodConsole {
    /// Creates an empty console with no collaborator.
    pub fn new() -> Self {
        MethodConsole {
            registry: MethodRegistry::new(),
            editor: EditorState::Closed,
            pending_removal: None,
        }
    }

    /// Creates an empty console notifying the given sink.
    pub fn with_events(events: Box<dyn MethodEvents>) -> Self {
        MethodConsole {
            registry: MethodRegistry::with_events(events),
            editor: EditorState::Closed,
            pending_removal: None,
        }
    }

    /// Replaces the working list from the externally owned list.
    pub fn sync(&mut self, external: &[PaymentMethod]) {
        self.registry.sync(external);
    }

    /// The render-ready list, invariant repaired.
    pub fn methods_for_display(&self) -> Vec<PaymentMethod> {
        self.registry.normalize_for_display()
    }

    /// Whether set-as-default controls are offered.
    pub fn can_manage_multiple(&self) -> bool {
        self.registry.can_manage_multiple()
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Makes an existing record the default.
    pub fn set_default(&mut self, id: &str) {
        self.registry.set_default(id);
    }

    /// Opens the add dialog for the picked type.
    ///
    /// The first method into an empty registry is pre-flagged default;
    /// any previously open dialog is discarded.
    pub fn open_add(&mut self, method_type: MethodType) {
        let form = MethodFormState::blank(method_type, self.registry.is_empty());
        self.editor = EditorState::Adding(form);
    }

    /// Opens the edit dialog prefilled from an existing record.
    ///
    /// Returns `false` (leaving the editor untouched) for unknown ids.
    pub fn open_edit(&mut self, id: &str) -> bool {
        match self.registry.get(id) {
            Some(method) => {
                self.editor = EditorState::Editing(MethodFormState::from_method(method));
                true
            }
            None => false,
        }
    }

    /// Discards the staged form.
    pub fn cancel_editor(&mut self) {
        self.editor = EditorState::Closed;
    }

    /// The staged form, if a dialog is open.
    pub fn form(&self) -> Option<&MethodFormState> {
        self.editor.form()
    }

    /// Mutable access to the staged form for field-level changes.
    pub fn form_mut(&mut self) -> Option<&mut MethodFormState> {
        self.editor.form_mut()
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Submits the staged form into the registry.
    ///
    /// Whether this is an edit is decided by looking the staged id up in
    /// the registry, not by which dialog is open. The dialog closes, the
    /// record lands via upsert, and the collaborator is notified with the
    /// record as stored. Returns `None` when no dialog is open.
    pub fn submit(&mut self) -> Option<PaymentMethod> {
        let form = match mem::replace(&mut self.editor, EditorState::Closed) {
            EditorState::Closed => return None,
            EditorState::Adding(form) | EditorState::Editing(form) => form,
        };

        let is_edit = form
            .id
            .as_deref()
            .is_some_and(|id| self.registry.get(id).is_some());

        let method = form.into_method(Utc::now().year().max(0) as u32);
        self.registry.upsert(method.clone(), is_edit);

        // Re-read so the notification carries the post-invariant flags.
        let stored = self
            .registry
            .get(&method.id)
            .cloned()
            .unwrap_or(method);

        if is_edit {
            self.registry.events_mut().on_edit(&stored);
        } else {
            self.registry.events_mut().on_add(&stored);
        }

        Some(stored)
    }

    /// First step of removal: stages the id for confirmation.
    pub fn request_remove(&mut self, id: &str) {
        self.pending_removal = Some(id.to_string());
    }

    /// The id awaiting confirmation, if any.
    pub fn pending_removal(&self) -> Option<&str> {
        self.pending_removal.as_deref()
    }

    /// Second step of removal: performs the staged deletion.
    ///
    /// Returns the removed id, or `None` when nothing was pending.
    pub fn confirm_remove(&mut self) -> Option<String> {
        let id = self.pending_removal.take()?;
        self.registry.remove(&id);
        Some(id)
    }

    /// Abandons a pending removal with no side effect.
    pub fn cancel_remove(&mut self) {
        self.pending_removal = None;
    }

    /// Processes scripted operations from a CSV reader in streaming
    /// fashion.
    ///
    /// Records are read one at a time; invalid records are logged at warn
    /// level and skipped, never fatal.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<OpRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => match record.parse() {
                    Some(op) => self.apply(op, row_num),
                    None => warn!("Row {row_num}: failed to parse operation record"),
                },
                Err(e) => {
                    warn!("Row {row_num}: CSV parse error: {e}");
                }
            }
        }

        Ok(())
    }

    /// Applies a single parsed operation.
    fn apply(&mut self, op: Op, row: usize) {
        match op {
            Op::Add {
                method_type,
                fields,
            } => {
                self.open_add(method_type);
                self.replay_fields(&fields);
                if let Some(method) = self.submit() {
                    debug!("Row {row}: added {} method {}", method_type.as_str(), method.id);
                }
            }
            Op::Edit { id, fields } => {
                if !self.open_edit(&id) {
                    warn!("Row {row}: edit references unknown method {id}, ignoring");
                    return;
                }
                self.replay_fields(&fields);
                self.submit();
                debug!("Row {row}: edited method {id}");
            }
            Op::SetDefault { id } => {
                if self.registry.get(&id).is_none() {
                    warn!("Row {row}: set_default references unknown method {id}, ignoring");
                    return;
                }
                self.set_default(&id);
                debug!("Row {row}: set default method {id}");
            }
            Op::Remove { id } => {
                self.request_remove(&id);
                self.confirm_remove();
                debug!("Row {row}: removed method {id}");
            }
        }
    }

    /// Replays provided field input through the staged form. Absent
    /// columns leave the staged value untouched.
    fn replay_fields(&mut self, fields: &FieldInput) {
        let Some(form) = self.editor.form_mut() else {
            return;
        };

        if let Some(brand) = &fields.brand {
            form.brand = brand.clone();
        }
        if let Some(bank) = &fields.bank {
            form.bank = bank.clone();
        }
        if let Some(handle) = &fields.handle {
            form.handle = handle.clone();
        }
        if let Some(nickname) = &fields.nickname {
            form.nickname = nickname.clone();
        }
        if let Some(last4) = &fields.last4 {
            form.set_last4(last4);
        }
        if let Some(card_number) = &fields.card_number {
            form.set_card_number(card_number);
        }
        if let Some(expiration) = &fields.expiration {
            form.set_expiration(expiration);
        }
        if let Some(flag) = fields.default {
            form.is_default = flag;
        }
    }

    /// Writes the normalized list to CSV.
    ///
    /// One row per record in list order, with the display label and the
    /// expiration split into its stored fields (blank for non-cards).
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "type", "label", "last4", "exp_month", "exp_year", "default"])?;

        for method in self.methods_for_display() {
            let (exp_month, exp_year) = method.kind.expiration();
            csv_writer.write_record([
                method.id.clone(),
                method.method_type().as_str().to_string(),
                display_label(&method),
                method.last4.clone(),
                exp_month.map(|v| v.to_string()).unwrap_or_default(),
                exp_year.map(|v| v.to_string()).unwrap_or_default(),
                method.is_default.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for MethodConsole {
    fn default() -> Self {
        Self::new()
    }
}
