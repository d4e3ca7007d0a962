use crate::field::FieldId;
use std::collections::BTreeSet;

/// Fields the operator edited since the last load or save.
///
/// Membership is the only gate the payload builder trusts: a field missing
/// from this set is never sent, whatever its in-memory value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchedFields {
    fields: BTreeSet<FieldId>,
}

impl TouchedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time `field` is marked.
    pub fn mark_touched(&mut self, field: FieldId) -> bool {
        self.fields.insert(field)
    }

    pub fn is_touched(&self, field: FieldId) -> bool {
        self.fields.contains(&field)
    }

    pub fn reset(&mut self) {
        self.fields.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.iter().copied()
    }
}

impl FromIterator<FieldId> for TouchedFields {
    fn from_iter<I: IntoIterator<Item = FieldId>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
