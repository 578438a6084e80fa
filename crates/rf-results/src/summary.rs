//! Tab-separated iteration summary log.
//!
//! A header block describes the model and the optimization problem, then
//! one row per whole-model evaluation follows:
//! `iteration, objective, real values, binary values, constraint values`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::{ProblemDescription, SummaryRow};
use crate::{ResultsError, ResultsResult};

const RULE: &str = "----------------------------------------------------------------------";

pub struct SummaryWriter<W: Write> {
    out: W,
    reals: usize,
    binaries: usize,
    constraints: usize,
    rows: usize,
}

impl SummaryWriter<BufWriter<File>> {
    /// Create (or truncate) the summary file at `path` and write the header.
    pub fn create(path: &Path, problem: &ProblemDescription) -> ResultsResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), problem)
    }
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(out: W, problem: &ProblemDescription) -> ResultsResult<Self> {
        let mut writer = Self {
            out,
            reals: problem.real_variables.len(),
            binaries: problem.binary_variables.len(),
            constraints: problem.constraints.len(),
            rows: 0,
        };
        writer.write_header(problem)?;
        Ok(writer)
    }

    fn write_header(&mut self, p: &ProblemDescription) -> ResultsResult<()> {
        let out = &mut self.out;
        writeln!(out, "{RULE}")?;
        writeln!(
            out,
            "------------------------ resflow Summary File ------------------------"
        )?;
        writeln!(out, "{RULE}\n")?;

        writeln!(out, "MODEL DESCRIPTION:")?;
        writeln!(out, "Number of wells      = {}", p.wells)?;
        writeln!(out, "Number of pipes      = {}", p.pipes)?;
        writeln!(out, "Number of separators = {}", p.separators)?;
        writeln!(out, "Number of boosters   = {}\n", p.boosters)?;

        writeln!(out, "OPTIMIZATION PROBLEM:")?;
        writeln!(out, "Number of continuous variables  = {}", p.real_variables.len())?;
        writeln!(out, "Number of binary variables      = {}", p.binary_variables.len())?;
        writeln!(out, "Number of constraints           = {}\n", p.constraints.len())?;

        writeln!(out, "CONTINUOUS VARIABLES:")?;
        for (i, v) in p.real_variables.iter().enumerate() {
            writeln!(
                out,
                "VAR_C{}: {}, bounds: ({} < {} < {})",
                i + 1,
                v.name,
                v.min,
                v.value,
                v.max
            )?;
        }
        writeln!(out)?;

        writeln!(out, "BINARY VARIABLES:")?;
        for (i, v) in p.binary_variables.iter().enumerate() {
            writeln!(
                out,
                "VAR_B{}: {}, bounds: ({} < {} < {})",
                i + 1,
                v.name,
                v.min,
                v.value,
                v.max
            )?;
        }
        writeln!(out)?;

        writeln!(out, "CONSTRAINTS:")?;
        for (i, c) in p.constraints.iter().enumerate() {
            writeln!(
                out,
                "CON{}: {}, bounds: ({} < c < {})",
                i + 1,
                c.name,
                c.min,
                c.max
            )?;
        }

        writeln!(out, "\nMODEL EVALUATIONS:")?;
        writeln!(out, "{RULE}")?;

        write!(out, "#\tOBJ\t")?;
        for i in 0..p.real_variables.len() {
            write!(out, "VAR_C{}\t", i + 1)?;
        }
        for i in 0..p.binary_variables.len() {
            write!(out, "VAR_B{}\t", i + 1)?;
        }
        for i in 0..p.constraints.len() {
            write!(out, "CON{}\t", i + 1)?;
        }
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }

    /// Append one evaluation and flush.
    pub fn write_row(&mut self, row: &SummaryRow) -> ResultsResult<()> {
        check_shape("real", self.reals, row.real_values.len())?;
        check_shape("binary", self.binaries, row.binary_values.len())?;
        check_shape("constraint", self.constraints, row.constraint_values.len())?;

        write!(self.out, "{}\t{}\t", row.iteration, row.objective)?;
        for v in row
            .real_values
            .iter()
            .chain(&row.binary_values)
            .chain(&row.constraint_values)
        {
            write!(self.out, "{v}\t")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn check_shape(what: &'static str, expected: usize, found: usize) -> ResultsResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ResultsError::RowShape {
            what,
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConstraintDecl, VariableDecl};

    fn problem() -> ProblemDescription {
        ProblemDescription {
            wells: 1,
            pipes: 2,
            separators: 0,
            boosters: 0,
            real_variables: vec![
                VariableDecl {
                    name: "W1_bhp_1".to_string(),
                    min: 50.0,
                    value: 150.0,
                    max: 190.0,
                },
                VariableDecl {
                    name: "W1_P1_fraction".to_string(),
                    min: 0.0,
                    value: 0.5,
                    max: 1.0,
                },
            ],
            binary_variables: vec![],
            constraints: vec![ConstraintDecl {
                name: "W1_routing".to_string(),
                min: 1.0,
                max: 1.0,
            }],
        }
    }

    #[test]
    fn header_declares_problem() {
        let writer = SummaryWriter::new(Vec::new(), &problem()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains("Number of wells      = 1"));
        assert!(text.contains("Number of continuous variables  = 2"));
        assert!(text.contains("VAR_C1: W1_bhp_1, bounds: (50 < 150 < 190)"));
        assert!(text.contains("CON1: W1_routing, bounds: (1 < c < 1)"));
        assert!(text.ends_with("#\tOBJ\tVAR_C1\tVAR_C2\tCON1\t\n"));
    }

    #[test]
    fn rows_are_tab_separated_in_fixed_order() {
        let mut writer = SummaryWriter::new(Vec::new(), &problem()).unwrap();
        writer
            .write_row(&SummaryRow {
                iteration: 1,
                objective: 1234.5,
                real_values: vec![150.0, 0.5],
                binary_values: vec![],
                constraint_values: vec![1.0],
            })
            .unwrap();
        assert_eq!(writer.rows_written(), 1);
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.ends_with("1\t1234.5\t150\t0.5\t1\t\n"));
    }

    #[test]
    fn row_with_wrong_shape_is_rejected() {
        let mut writer = SummaryWriter::new(Vec::new(), &problem()).unwrap();
        let err = writer
            .write_row(&SummaryRow {
                iteration: 1,
                objective: 0.0,
                real_values: vec![1.0],
                binary_values: vec![],
                constraint_values: vec![1.0],
            })
            .unwrap_err();
        assert!(matches!(
            err,
            ResultsError::RowShape {
                what: "real",
                expected: 2,
                found: 1
            }
        ));
    }
}
