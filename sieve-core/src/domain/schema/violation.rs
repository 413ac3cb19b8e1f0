// sieve-core/src/domain/schema/violation.rs

use serde::Serialize;
use std::fmt;
use validator::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    MissingColumn,
    Null,
    NotANumber { value: String },
    NotAnInteger { value: String },
    NotATimestamp { value: String },
    /// A value-level predicate failed (range, pattern, ...).
    Constraint { value: String, rule: String },
    DuplicateKey { value: String },
    DanglingReference { value: String, target: String },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn => write!(f, "column is missing"),
            Self::Null => write!(f, "null value in non-nullable column"),
            Self::NotANumber { value } => write!(f, "'{}' is not a number", value),
            Self::NotAnInteger { value } => write!(f, "'{}' is not a 64-bit integer", value),
            Self::NotATimestamp { value } => write!(f, "'{}' is not a timestamp", value),
            Self::Constraint { value, rule } => write!(f, "{} {}", value, rule),
            Self::DuplicateKey { value } => write!(f, "duplicate key '{}'", value),
            Self::DanglingReference { value, target } => {
                write!(f, "'{}' does not reference an existing {}", value, target)
            }
        }
    }
}

/// One failed check. `row` is the 0-based position in the checked table,
/// `None` for table-level problems such as a missing column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub table: String,
    pub row: Option<usize>,
    pub column: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(
                f,
                "[{}] row {}, column '{}': {}",
                self.table, row, self.column, self.kind
            ),
            None => write!(f, "[{}] column '{}': {}", self.table, self.column, self.kind),
        }
    }
}

/// Lazily collected violations: checks keep going after a failure and the
/// caller decides pass/fail once everything has been looked at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    table: String,
    violations: Vec<Violation>,
}

impl SchemaReport {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            violations: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Option<usize>, column: &str, kind: ViolationKind) {
        self.violations.push(Violation {
            table: self.table.clone(),
            row,
            column: column.to_string(),
            kind,
        });
    }

    /// Folds `validator` derive errors for one row into the report, sorted by
    /// column so output does not depend on hash order.
    pub fn extend_from_validation(&mut self, row: usize, errors: &ValidationErrors) {
        let table = &self.table;
        let mut found: Vec<Violation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                let column = field.to_string();
                field_errors.iter().map(move |error| {
                    let value = error
                        .params
                        .get("value")
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    let rule = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    Violation {
                        table: table.clone(),
                        row: Some(row),
                        column: column.clone(),
                        kind: ViolationKind::Constraint { value, rule },
                    }
                })
            })
            .collect();
        found.sort_by(|a, b| a.column.cmp(&b.column));
        self.violations.extend(found);
    }

    /// Appends another report, keeping its table labels.
    pub fn merge(&mut self, other: SchemaReport) {
        self.violations.extend(other.violations);
    }

    /// `Ok(())` when nothing was found, the report itself otherwise.
    pub fn into_result(self) -> Result<(), SchemaReport> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "  - {}", violation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 0, message = "must be >= 0"))]
        stock: i64,
        #[validate(range(min = 1, message = "must be > 0"))]
        weight: i64,
    }

    #[test]
    fn test_report_collects_everything() {
        let mut report = SchemaReport::new("products");
        report.push(None, "sku", ViolationKind::MissingColumn);

        let mut inventory = SchemaReport::new("inventory");
        inventory.push(Some(3), "on_hand", ViolationKind::Null);
        report.merge(inventory);

        assert_eq!(report.len(), 2);
        assert_eq!(
            report.to_string(),
            "  - [products] column 'sku': column is missing\n  - [inventory] row 3, column 'on_hand': null value in non-nullable column\n"
        );
    }

    #[test]
    fn test_extend_from_validation_maps_messages() {
        let sample = Sample {
            stock: -1,
            weight: 0,
        };
        let errors = match sample.validate() {
            Err(errors) => errors,
            Ok(()) => panic!("sample must fail validation"),
        };

        let mut report = SchemaReport::new("fact_inventory");
        report.extend_from_validation(7, &errors);

        let rendered: Vec<String> = report.violations().iter().map(|v| v.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "[fact_inventory] row 7, column 'stock': -1 must be >= 0",
                "[fact_inventory] row 7, column 'weight': 0 must be > 0",
            ]
        );
    }
}
