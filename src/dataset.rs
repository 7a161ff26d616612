use rayon::prelude::*;
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::HandlerError;

// Below this many rows the rayon hand-off costs more than the scan itself
pub const PARALLEL_THRESHOLD: usize = 1024;

static EMPLOYEES: OnceLock<Table> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Employee {
    pub employee_name: String,
    pub department: String,
    pub salary: i64,
}

impl Employee {
    fn new(name: &str, department: &str, salary: i64) -> Self {
        Employee {
            employee_name: name.to_string(),
            department: department.to_string(),
            salary,
        }
    }
}

/// Ordered, read-only set of employee rows.
#[derive(Debug)]
pub struct Table {
    rows: Vec<Employee>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    Parallel,
}

impl ExecMode {
    pub fn for_rows(len: usize, workers: usize) -> Self {
        if workers > 1 && len >= PARALLEL_THRESHOLD {
            ExecMode::Parallel
        } else {
            ExecMode::Sequential
        }
    }
}

/// Rows picked out of a [`Table`] by a single department predicate.
#[derive(Debug)]
pub struct Selection<'a> {
    rows: Vec<&'a Employee>,
    mode: ExecMode,
}

// Process-wide table, built on first access and never written again
pub fn employees() -> &'static Table {
    EMPLOYEES.get_or_init(|| {
        Table::new(vec![
            Employee::new("James", "Sales", 3000),
            Employee::new("Michael", "Sales", 4600),
            Employee::new("Robert", "Sales", 4100),
            Employee::new("Maria", "Finance", 3000),
        ])
    })
}

impl Table {
    pub fn new(rows: Vec<Employee>) -> Self {
        Table { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Select every row, or only rows whose department equals `department`
    /// exactly. Row order is kept in both modes.
    pub fn select(&self, department: Option<&str>, mode: ExecMode) -> Selection<'_> {
        let rows: Vec<&Employee> = match (department, mode) {
            (None, _) => self.rows.iter().collect(),
            (Some(dept), ExecMode::Sequential) => {
                self.rows.iter().filter(|e| e.department == dept).collect()
            }
            // Vec collect from a rayon iterator keeps source order
            (Some(dept), ExecMode::Parallel) => {
                self.rows.par_iter().filter(|e| e.department == dept).collect()
            }
        };
        Selection { rows, mode }
    }
}

impl<'a> Selection<'a> {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[&'a Employee] {
        &self.rows
    }

    /// Mean salary of the selection, `None` when nothing matched.
    pub fn average_salary(&self) -> Result<Option<f64>, HandlerError> {
        if self.rows.is_empty() {
            return Ok(None);
        }

        let sum = match self.mode {
            ExecMode::Sequential => self
                .rows
                .iter()
                .try_fold(0i64, |acc, e| acc.checked_add(e.salary)),
            ExecMode::Parallel => self
                .rows
                .par_iter()
                .map(|e| Some(e.salary))
                .try_reduce(|| 0i64, |a, b| a.checked_add(b)),
        }
        .ok_or(HandlerError::AggregateOverflow { rows: self.rows.len() })?;

        Ok(Some(sum as f64 / self.rows.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(sel: &Selection<'a>) -> Vec<&'a str> {
        sel.rows().iter().map(|e| e.employee_name.as_str()).collect()
    }

    #[test]
    fn static_table_has_four_rows_in_order() {
        let table = employees();
        assert_eq!(table.len(), 4);
        let all = table.select(None, ExecMode::Sequential);
        assert_eq!(names(&all), ["James", "Michael", "Robert", "Maria"]);
        assert!(std::ptr::eq(table, employees()));
    }

    #[test]
    fn sales_filter_keeps_order_and_averages() {
        let sel = employees().select(Some("Sales"), ExecMode::Sequential);
        assert_eq!(names(&sel), ["James", "Michael", "Robert"]);
        assert_eq!(sel.count(), 3);
        assert_eq!(sel.average_salary().unwrap(), Some(3900.0));
    }

    #[test]
    fn finance_filter() {
        let sel = employees().select(Some("Finance"), ExecMode::Sequential);
        assert_eq!(names(&sel), ["Maria"]);
        assert_eq!(sel.average_salary().unwrap(), Some(3000.0));
    }

    #[test]
    fn filter_is_exact_and_case_sensitive() {
        for dept in ["sales", "Sales ", "Sal", "Engineering"] {
            let sel = employees().select(Some(dept), ExecMode::Sequential);
            assert_eq!(sel.count(), 0, "{dept:?} should match nothing");
            assert_eq!(sel.average_salary().unwrap(), None);
        }
    }

    #[test]
    fn unfiltered_average() {
        let sel = employees().select(None, ExecMode::Sequential);
        assert_eq!(sel.average_salary().unwrap(), Some(3675.0));
    }

    #[test]
    fn parallel_scan_matches_sequential() {
        let rows = (0..5000)
            .map(|i| {
                let dept = if i % 3 == 0 { "Finance" } else { "Sales" };
                Employee::new(&format!("emp_{i:05}"), dept, 1000 + i)
            })
            .collect();
        let table = Table::new(rows);
        assert_eq!(ExecMode::for_rows(table.len(), 4), ExecMode::Parallel);

        let seq = table.select(Some("Finance"), ExecMode::Sequential);
        let par = table.select(Some("Finance"), ExecMode::Parallel);
        assert_eq!(seq.rows(), par.rows());
        assert_eq!(seq.average_salary().unwrap(), par.average_salary().unwrap());
    }

    #[test]
    fn small_tables_scan_sequentially() {
        assert_eq!(ExecMode::for_rows(4, 6), ExecMode::Sequential);
        assert_eq!(ExecMode::for_rows(1_000_000, 1), ExecMode::Sequential);
    }

    #[test]
    fn overflowing_sum_is_an_error() {
        let table = Table::new(vec![
            Employee::new("a", "X", i64::MAX),
            Employee::new("b", "X", 1),
        ]);
        for mode in [ExecMode::Sequential, ExecMode::Parallel] {
            let err = table.select(Some("X"), mode).average_salary().unwrap_err();
            assert_eq!(err.kind(), "AggregateOverflow");
        }
    }

    #[test]
    fn employee_serializes_with_pascal_case_keys() {
        let json = serde_json::to_string(&Employee::new("Maria", "Finance", 3000)).unwrap();
        assert_eq!(json, r#"{"EmployeeName":"Maria","Department":"Finance","Salary":3000}"#);
    }
}
