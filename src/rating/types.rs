use serde::{Deserialize, Serialize};
use std::fmt;

pub type AthleteId = String;
pub type EquipmentId = String;
pub type StrengthValue = f64;

/// A single head-to-head result between two athletes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub athlete1: AthleteId,
    pub athlete2: AthleteId,
    pub athlete1_won: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment1: Option<EquipmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment2: Option<EquipmentId>,
}

impl Comparison {
    pub fn new(athlete1: &str, athlete2: &str, athlete1_won: bool) -> Self {
        Self {
            athlete1: athlete1.to_string(),
            athlete2: athlete2.to_string(),
            athlete1_won,
            equipment1: None,
            equipment2: None,
        }
    }

    pub fn with_equipment(mut self, equipment1: &str, equipment2: &str) -> Self {
        self.equipment1 = Some(equipment1.to_string());
        self.equipment2 = Some(equipment2.to_string());
        self
    }

    pub fn is_self_comparison(&self) -> bool {
        self.athlete1 == self.athlete2
    }
}

/// Options accepted by the fitting entry point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitOptions {
    pub include_equipment_bias: bool,
}

impl FitOptions {
    pub fn with_equipment_bias() -> Self {
        Self {
            include_equipment_bias: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteNode {
    pub id: AthleteId,
    pub strength: StrengthValue,
    pub standard_error: f64,
    pub confidence_interval: (f64, f64),
    pub comparisons: u32,
    pub confidence_level: ConfidenceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentNode {
    pub id: EquipmentId,
    pub speed_parameter: f64,
    pub comparisons_in_shell: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Unranked,    // < 3 contests
    Provisional, // 3-9 contests
    Established, // 10+ contests
}

impl ConfidenceLevel {
    pub fn from_comparisons(comparisons: u32) -> Self {
        if comparisons < 3 {
            ConfidenceLevel::Unranked
        } else if comparisons < 10 {
            ConfidenceLevel::Provisional
        } else {
            ConfidenceLevel::Established
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConfidenceLevel::Unranked => "unranked",
            ConfidenceLevel::Provisional => "provisional",
            ConfidenceLevel::Established => "established",
        }
    }
}

/// Non-fatal conditions detected while fitting. Never raised as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DegenerateInputWarning {
    /// Athlete won (or lost) every contest they took part in
    CompleteSeparation { athlete: AthleteId, undefeated: bool },
    /// Comparison graph splits into several independent groups
    DisconnectedGraph { components: usize },
    /// Iteration cap hit before the tolerance was reached
    NotConverged { iterations: usize },
    /// No contest between two distinct athletes exists
    NoContrasts,
}

impl fmt::Display for DegenerateInputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompleteSeparation { athlete, undefeated: true } => {
                write!(f, "athlete {athlete} won every contest")
            }
            Self::CompleteSeparation { athlete, undefeated: false } => {
                write!(f, "athlete {athlete} lost every contest")
            }
            Self::DisconnectedGraph { components } => {
                write!(f, "comparison graph has {components} disconnected components")
            }
            Self::NotConverged { iterations } => {
                write!(f, "solver did not converge within {iterations} iterations")
            }
            Self::NoContrasts => write!(f, "no contests between distinct athletes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceInfo {
    pub iterations: usize,
    pub converged: bool,
    pub final_log_likelihood: f64,
    #[serde(default)]
    pub warnings: Vec<DegenerateInputWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitResult {
    pub athletes: Vec<AthleteNode>,
    pub equipment: Vec<EquipmentNode>,
    pub convergence: ConvergenceInfo,
}

impl FitResult {
    pub fn athlete(&self, id: &str) -> Option<&AthleteNode> {
        self.athletes.iter().find(|a| a.id == id)
    }

    pub fn equipment_node(&self, id: &str) -> Option<&EquipmentNode> {
        self.equipment.iter().find(|e| e.id == id)
    }

    pub fn strength(&self, id: &str) -> Option<f64> {
        self.athlete(id).map(|a| a.strength)
    }
}
