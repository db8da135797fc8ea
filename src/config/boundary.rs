//! Boundary condition patterns

use serde::{Deserialize, Serialize};

/// Simulation regime selected for the box walls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryCondition {
    #[default]
    #[serde(rename = "Cavity-Flow")]
    CavityFlow,
    #[serde(rename = "Poiseuille-Flow")]
    PoiseuilleFlow,
    #[serde(rename = "Periodic-Flow")]
    PeriodicFlow,
    #[serde(rename = "LidDrivenCavity")]
    LidDrivenCavity,
}

impl BoundaryCondition {
    pub const ALL: [BoundaryCondition; 4] = [
        BoundaryCondition::CavityFlow,
        BoundaryCondition::PoiseuilleFlow,
        BoundaryCondition::PeriodicFlow,
        BoundaryCondition::LidDrivenCavity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BoundaryCondition::CavityFlow => "Cavity-Flow",
            BoundaryCondition::PoiseuilleFlow => "Poiseuille-Flow",
            BoundaryCondition::PeriodicFlow => "Periodic-Flow",
            BoundaryCondition::LidDrivenCavity => "LidDrivenCavity",
        }
    }

    /// Whether the lid velocity is meaningful. Only Cavity-Flow carries it
    /// to the solver; `LidDrivenCavity` is driven by the solver's own setup.
    pub fn is_lid_driven(&self) -> bool {
        matches!(self, BoundaryCondition::CavityFlow)
    }
}

impl std::fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_match_display() {
        for bc in BoundaryCondition::ALL {
            let json = serde_json::to_string(&bc).unwrap();
            assert_eq!(json, format!("\"{}\"", bc.name()));
            let back: BoundaryCondition = serde_json::from_str(&json).unwrap();
            assert_eq!(back, bc);
        }
    }

    #[test]
    fn test_lid_driven_patterns() {
        assert!(BoundaryCondition::CavityFlow.is_lid_driven());
        assert!(!BoundaryCondition::LidDrivenCavity.is_lid_driven());
        assert!(!BoundaryCondition::PoiseuilleFlow.is_lid_driven());
        assert!(!BoundaryCondition::PeriodicFlow.is_lid_driven());
    }
}
