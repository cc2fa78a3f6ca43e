//! Host-side analysis state with an eager recompute contract.
//!
//! The host owns the dataset and the three scalar inputs. Every mutation goes
//! through a `Session` setter, which runs one complete `run_analysis` pass
//! before returning, so the results a reader observes always belong to the
//! current inputs. A failed pass replaces the previous results with the error;
//! nothing stale survives.

use crate::app::pipeline::{AnalysisOutput, run_analysis};
use crate::domain::{
    AcceptanceCriteria, Column, FittedCurve, StandardCurveDataset, TiterInputs, TiterResult,
};
use crate::error::AnalysisError;
use crate::fit::CurveFitter;

#[derive(Debug, Clone)]
pub struct Session {
    dataset: StandardCurveDataset,
    inputs: TiterInputs,
    fitter: CurveFitter,
    output: AnalysisOutput,
    revision: u64,
}

impl Session {
    pub fn new(dataset: StandardCurveDataset, inputs: TiterInputs, criteria: AcceptanceCriteria) -> Self {
        let fitter = CurveFitter::new(criteria);
        let output = run_analysis(&dataset, &inputs, &fitter);
        Self {
            dataset,
            inputs,
            fitter,
            output,
            revision: 0,
        }
    }

    /// Seed dataset and seed inputs with default acceptance criteria.
    pub fn seed() -> Self {
        Self::new(
            StandardCurveDataset::seed(),
            TiterInputs::seed(),
            AcceptanceCriteria::default(),
        )
    }

    pub fn dataset(&self) -> &StandardCurveDataset {
        &self.dataset
    }

    pub fn inputs(&self) -> &TiterInputs {
        &self.inputs
    }

    pub fn output(&self) -> &AnalysisOutput {
        &self.output
    }

    pub fn curve(&self) -> Result<&FittedCurve, &AnalysisError> {
        self.output.fit.as_ref()
    }

    pub fn predicted_sq(&self) -> Result<f64, &AnalysisError> {
        self.output.predicted_sq.as_ref().copied()
    }

    pub fn titer(&self) -> Result<&TiterResult, &AnalysisError> {
        self.output.titer.as_ref()
    }

    /// Number of recompute passes since construction.
    ///
    /// Observers compare revisions to tell whether results changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Edit one numeric cell. `row` is 0-based.
    ///
    /// An out-of-range row leaves the session untouched.
    pub fn edit_cell(&mut self, row: usize, column: Column, value: f64) -> Result<(), AnalysisError> {
        self.dataset.set_cell(row, column, value)?;
        self.recompute();
        Ok(())
    }

    /// Edit one cell from user-entered text; unparseable text becomes a missing value.
    pub fn edit_cell_text(&mut self, row: usize, column: Column, text: &str) -> Result<(), AnalysisError> {
        self.dataset.set_cell_text(row, column, text)?;
        self.recompute();
        Ok(())
    }

    pub fn replace_dataset(&mut self, dataset: StandardCurveDataset) {
        self.dataset = dataset;
        self.recompute();
    }

    pub fn set_unknown_cq(&mut self, value: Option<f64>) {
        self.inputs.unknown_cq = value;
        self.recompute();
    }

    pub fn set_genome_length_bp(&mut self, value: Option<f64>) {
        self.inputs.genome_length_bp = value;
        self.recompute();
    }

    pub fn set_dilution_factor(&mut self, value: Option<f64>) {
        self.inputs.dilution_factor = value;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.output = run_analysis(&self.dataset, &self.inputs, &self.fitter);
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_edit_bumps_revision() {
        let mut session = Session::seed();
        assert_eq!(session.revision(), 0);
        session.set_unknown_cq(Some(21.0));
        session.edit_cell(0, Column::Cq, 23.0).unwrap();
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn invalid_edit_withholds_all_results() {
        let mut session = Session::seed();
        assert!(session.titer().is_ok());

        session.edit_cell(2, Column::Sq, 0.0).unwrap();
        assert!(matches!(session.curve(), Err(AnalysisError::InvalidData { .. })));
        assert!(session.predicted_sq().is_err());
        assert!(session.titer().is_err());

        session.edit_cell(2, Column::Sq, 0.1).unwrap();
        assert!(session.titer().is_ok());
    }

    #[test]
    fn out_of_range_edit_does_not_recompute() {
        let mut session = Session::seed();
        assert!(session.edit_cell(10, Column::Cq, 1.0).is_err());
        assert_eq!(session.revision(), 0);
        assert_eq!(session.dataset(), &StandardCurveDataset::seed());
    }

    #[test]
    fn scalar_changes_refresh_titer() {
        let mut session = Session::seed();
        let before = session.titer().unwrap().titer;
        session.set_dilution_factor(Some(800.0));
        let after = session.titer().unwrap().titer;
        assert!((after / before - 2.0).abs() < 1e-12);

        session.set_dilution_factor(None);
        assert!(matches!(
            session.titer(),
            Err(AnalysisError::MissingInput { name: "dilution_factor" })
        ));
        assert!(session.predicted_sq().is_ok());
    }
}
