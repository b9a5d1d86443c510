//! Static grouping of sheet columns into displayed areas

/// A displayed area and the sheet columns whose counts add up to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Areas in display order. The order defines `labels`, `places` and the key
/// order of `seriesByPlace`.
pub const AREA_MAPPINGS: &[Area] = &[
    Area {
        name: "Main Gym",
        columns: &["Main Gym"],
    },
    Area {
        name: "Weight Room",
        columns: &["Weight Room", "Treadmills", "CV Stairmasters"],
    },
    Area {
        name: "Multipurpose Gym",
        columns: &["MP Gym"],
    },
    Area {
        name: "Track",
        columns: &["Track", "CV Rowers", "Bikes on Track", "CV Ellipticals"],
    },
    Area {
        name: "Aerobics Room",
        columns: &["Aerobics Room"],
    },
    Area {
        name: "Table Tennis",
        columns: &["Table Tennis"],
    },
    Area {
        name: "Lobby",
        columns: &["Cubby \"Cove\"", "Vicore Equipment", "Bikes in Lobby"],
    },
];

/// Area names in display order
pub fn area_names() -> Vec<String> {
    AREA_MAPPINGS.iter().map(|a| a.name.to_string()).collect()
}

/// Whether any area reads from the given column
pub fn is_mapped_column(column: &str) -> bool {
    AREA_MAPPINGS
        .iter()
        .any(|area| area.columns.contains(&column))
}
