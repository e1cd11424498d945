//! Named feature-group subsets of the normalized dataset.
//!
//! Downstream projection routines work on one group at a time (shape/size,
//! intensity/texture, SER texture energies). Extraction keeps the label
//! column and silently skips group columns the dataset does not carry.

use crate::config::SAMPLE_TYPE_COLUMN;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A named subset of feature columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub name: String,
    pub columns: Vec<String>,
}

impl FeatureGroup {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// The default feature groups for per-cell morphology datasets.
pub fn default_feature_groups() -> Vec<FeatureGroup> {
    let shape_and_size = [
        "body_roundness",
        "CellArea",
        "cellbody_area",
        "Cell_Elongation",
        "cell_full_length",
        "cell_half_width",
        "Cell_length_by_area",
        "Cell_width_by_area",
        "cytoplasm_area",
        "NucleusArea",
        "Nuc_Elongation",
        "Nuc_full_length",
        "Nuc_half_width",
        "Nuc_Roundness",
        "number_protrusions",
        "percentProtrusion",
        "protrusion_extent",
        "mean_prlength",
        "mean_protrusionarea",
        "skeleton_area",
        "skeleton_node_count",
        "skeletonareapercent",
        "total_protrusionarea",
        "ringregion_area",
    ];

    let intensity_and_texture = [
        "cytointensityAct",
        "cytointensityTub",
        "CytoIntensityH",
        "CytoNonMembraneIntensityAct",
        "CytoNonMembraneIntensityTub",
        "GaborMax1_Actin",
        "GaborMin1_Actin",
        "HarConCellAct",
        "HarConCytoTub",
        "HarConMembAct",
        "HarCorrCellAct",
        "HarCorrCytoTub",
        "HarCorrMembAct",
        "HarHomCellAct",
        "HarHomCytoTub",
        "HarHomMembAct",
        "HarSVCellAct",
        "HarSVCytoTub",
        "HarSVMembAct",
        "logNucbyRingAct",
        "logNucbyRingTub",
        "MembranebyCytoOnlyAct",
        "MembranebyCytoOnlyTub",
        "MembraneIntensityAct",
        "MembraneIntensityTub",
        "NucbyCytoArea",
        "NucbyRingAct",
        "NucbyRingTub",
        "NucIntensityAct",
        "NucIntensityTub",
        "NucIntensityH",
        "NucPlusRingAct",
        "NucPlusRingTub",
        "ProtrusionIntensityAct",
        "ProtrusionIntensityTub",
        "RingbyCytoAct",
        "RingbyCytoTub",
        "ringIntensityAct",
        "ringIntensityTub",
        "RingIntensityH",
        "WholeCellIntensityAct",
        "WholeCellIntensityTub",
        "WholeCellIntensityH",
    ];

    // SER texture grid: pattern x region.
    let ser: Vec<String> = ["Bright", "Dark", "Edge", "Hole", "Ridge", "Saddle", "Spot", "Valley"]
        .iter()
        .flat_map(|pattern| {
            ["CellAct", "CytoTub", "MembAct", "Nuc"]
                .iter()
                .map(move |region| format!("SER{pattern}{region}"))
        })
        .collect();

    vec![
        FeatureGroup::new(
            "shape_and_size",
            shape_and_size.iter().map(|s| s.to_string()).collect(),
        ),
        FeatureGroup::new(
            "intensity_and_texture",
            intensity_and_texture.iter().map(|s| s.to_string()).collect(),
        ),
        FeatureGroup::new("ser", ser),
    ]
}

/// Select the label column plus the group columns present in `df`.
///
/// Group columns missing from the dataset are skipped, not errors; feature
/// group definitions are a superset of any single experiment's columns.
pub fn extract(df: &DataFrame, group: &FeatureGroup) -> Result<DataFrame> {
    let present: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();

    let mut selected: Vec<&str> = Vec::with_capacity(group.columns.len() + 1);
    if present.contains(&SAMPLE_TYPE_COLUMN) {
        selected.push(SAMPLE_TYPE_COLUMN);
    }
    for col in &group.columns {
        if present.contains(&col.as_str()) {
            selected.push(col);
        }
    }

    debug!(
        "Feature group '{}': {} of {} columns present",
        group.name,
        selected.len().saturating_sub(1),
        group.columns.len()
    );

    Ok(df.select(selected)?)
}
