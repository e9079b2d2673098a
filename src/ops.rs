//! Scripted registry operations for CSV parsing and internal representation.

use crate::method::MethodType;
use serde::Deserialize;

/// Raw operation record as read from CSV.
///
/// Only `op` is always required; the remaining columns apply per
/// operation and empty cells deserialize as `None`.
#[derive(Debug, Deserialize)]
pub struct OpRecord {
    /// Operation: add, edit, set_default, remove
    pub op: String,

    /// Target record id (edit/set_default/remove)
    #[serde(default)]
    pub id: Option<String>,

    /// Method type tag (add)
    #[serde(rename = "type", default)]
    pub method_type: Option<String>,

    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default)]
    pub bank: Option<String>,

    #[serde(default)]
    pub handle: Option<String>,

    #[serde(default)]
    pub last4: Option<String>,

    /// Raw card number input, replayed through the editor (add/edit)
    #[serde(default)]
    pub card_number: Option<String>,

    /// Raw expiration input, replayed through the editor (add/edit)
    #[serde(default)]
    pub expiration: Option<String>,

    #[serde(default)]
    pub nickname: Option<String>,

    /// Default-flag toggle: "true" or "false" (add/edit)
    #[serde(default)]
    pub default: Option<String>,
}

impl OpRecord {
    /// Parses the raw CSV record into a typed operation.
    ///
    /// Returns `None` if the record is invalid (unknown op, missing id,
    /// unknown method type).
    pub fn parse(&self) -> Option<Op> {
        let op = self.op.trim().to_lowercase();

        match op.as_str() {
            "add" => {
                let tag = self.method_type.as_deref()?.trim();
                let method_type = MethodType::parse(tag)?;
                Some(Op::Add {
                    method_type,
                    fields: self.fields(),
                })
            }
            "edit" => Some(Op::Edit {
                id: self.target_id()?,
                fields: self.fields(),
            }),
            "set_default" => Some(Op::SetDefault {
                id: self.target_id()?,
            }),
            "remove" => Some(Op::Remove {
                id: self.target_id()?,
            }),
            _ => None,
        }
    }

    fn target_id(&self) -> Option<String> {
        let id = self.id.as_deref()?.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    fn fields(&self) -> FieldInput {
        FieldInput {
            brand: self.brand.clone(),
            bank: self.bank.clone(),
            handle: self.handle.clone(),
            last4: self.last4.clone(),
            card_number: self.card_number.clone(),
            expiration: self.expiration.clone(),
            nickname: self.nickname.clone(),
            default: self
                .default
                .as_deref()
                .and_then(|s| s.trim().parse::<bool>().ok()),
        }
    }
}

/// A parsed operation ready to apply.
#[derive(Debug, Clone)]
pub enum Op {
    /// Open the add dialog for a type, replay field input, submit.
    Add {
        method_type: MethodType,
        fields: FieldInput,
    },

    /// Open the edit dialog for an existing record, replay only the
    /// provided fields, submit.
    Edit { id: String, fields: FieldInput },

    /// Promote the record to default.
    SetDefault { id: String },

    /// Request removal of the record and confirm it.
    Remove { id: String },
}

/// Field input replayed through the editor. `None` leaves the staged
/// value untouched.
#[derive(Debug, Clone, Default)]
pub struct FieldInput {
    pub brand: Option<String>,
    pub bank: Option<String>,
    pub handle: Option<String>,
    pub last4: Option<String>,
    pub card_number: Option<String>,
    pub expiration: Option<String>,
    pub nickname: Option<String>,
    pub default: Option<bool>,
}
