//! Rules spanning several arguments, checked once parsing is done.

use crate::style::highlight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// At least one of the arguments must be found.
    AtLeastOneFound,
    /// At most one of the arguments may be found.
    MutuallyExclusive,
}

#[derive(Debug, Clone)]
pub struct ArgConstraint {
    kind: ConstraintKind,
    /// Indices into the owning parser's argument list.
    args: Vec<usize>,
    violated: bool,
}

impl ArgConstraint {
    pub(crate) fn new(kind: ConstraintKind, args: Vec<usize>) -> Self {
        Self {
            kind,
            args,
            violated: false,
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn is_violated(&self) -> bool {
        self.violated
    }

    pub(crate) fn args(&self) -> &[usize] {
        &self.args
    }

    /// Re-check the rule; `found` tells whether an argument was matched.
    pub(crate) fn evaluate(&mut self, found: impl Fn(usize) -> bool) -> bool {
        let count = self.args.iter().filter(|&&id| found(id)).count();
        self.violated = match self.kind {
            ConstraintKind::AtLeastOneFound => count == 0,
            ConstraintKind::MutuallyExclusive => count > 1,
        };
        self.violated
    }

    pub(crate) fn reset(&mut self) {
        self.violated = false;
    }

    pub(crate) fn error_line(&self, error_id: &str, names: &[&str], colors: bool) -> String {
        let names = names
            .iter()
            .map(|name| highlight(name, colors))
            .collect::<Vec<_>>()
            .join(", ");
        match self.kind {
            ConstraintKind::AtLeastOneFound => {
                format!("{error_id}: At least one of these arguments is required: {names}")
            }
            ConstraintKind::MutuallyExclusive => {
                format!("{error_id}: These arguments are mutually exclusive: {names}")
            }
        }
    }

    pub(crate) fn help_line(&self, names: &[&str]) -> String {
        let label = match self.kind {
            ConstraintKind::AtLeastOneFound => "At least one of",
            ConstraintKind::MutuallyExclusive => "Mutually exclusive",
        };
        format!("{label}: {}", names.join(", "))
    }
}
