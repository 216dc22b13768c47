//! Evaluation classifier: raw swing (or gateway label) to display category.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chess::PieceColor;
use serde::{Deserialize, Serialize};

use crate::error::ReviewError;
use crate::model::Evaluation;

/// Display category of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Blunder,
    Mistake,
    Inaccuracy,
    /// Large swing in the mover's favour that the gateway marks as a missed win.
    MissedWin,
    SlightlyAccurate,
    StrongMove,
    Brilliant,
    Normal,
}

impl Classification {
    pub const ALL: [Self; 8] = [
        Self::Blunder,
        Self::Mistake,
        Self::Inaccuracy,
        Self::MissedWin,
        Self::SlightlyAccurate,
        Self::StrongMove,
        Self::Brilliant,
        Self::Normal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blunder => "blunder",
            Self::Mistake => "mistake",
            Self::Inaccuracy => "inaccuracy",
            Self::MissedWin => "missed_win",
            Self::SlightlyAccurate => "slightly_accurate",
            Self::StrongMove => "strong_move",
            Self::Brilliant => "brilliant",
            Self::Normal => "normal",
        }
    }

    /// Parse a gateway label. Case, spaces and hyphens are not significant.
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL.into_iter().find(|c| c.as_str() == key)
    }

    /// Annotation glyph shown next to the move.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Self::Blunder => Some("??"),
            Self::Mistake => Some("?"),
            Self::Inaccuracy => Some("?!"),
            Self::MissedWin => Some("?"),
            Self::StrongMove => Some("!"),
            Self::Brilliant => Some("!!"),
            Self::SlightlyAccurate | Self::Normal => None,
        }
    }

    /// Fixed colour pair for the category.
    pub fn style(self) -> DisplayStyle {
        STYLES[self as usize]
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| ReviewError::UnknownClassification(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayStyle {
    pub foreground: Rgb,
    pub background: Rgb,
}

const fn style(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> DisplayStyle {
    DisplayStyle {
        foreground: Rgb(fg.0, fg.1, fg.2),
        background: Rgb(bg.0, bg.1, bg.2),
    }
}

// Indexed by `Classification as usize`; keep in declaration order.
const STYLES: [DisplayStyle; 8] = [
    style((255, 255, 255), (180, 40, 40)),   // blunder
    style((255, 255, 255), (220, 110, 40)),  // mistake
    style((40, 40, 40), (240, 200, 70)),     // inaccuracy
    style((255, 255, 255), (150, 70, 170)),  // missed_win
    style((40, 40, 40), (170, 210, 150)),    // slightly_accurate
    style((255, 255, 255), (60, 140, 70)),   // strong_move
    style((255, 255, 255), (30, 150, 190)),  // brilliant
    style((220, 220, 220), (60, 60, 60)),    // normal
];

/// Swing cutpoints, most severe first. A move falls in the first band whose
/// cutpoint its `|swing|` strictly exceeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationBands {
    pub blunder: f64,
    pub mistake: f64,
    pub inaccuracy: f64,
    pub slightly_accurate: f64,
}

impl Default for ClassificationBands {
    fn default() -> Self {
        Self {
            blunder: 3.0,
            mistake: 1.5,
            inaccuracy: 1.0,
            slightly_accurate: 0.5,
        }
    }
}

impl ClassificationBands {
    pub fn new(
        blunder: f64,
        mistake: f64,
        inaccuracy: f64,
        slightly_accurate: f64,
    ) -> Result<Self, ReviewError> {
        let bands = Self {
            blunder,
            mistake,
            inaccuracy,
            slightly_accurate,
        };
        bands.validate()?;
        Ok(bands)
    }

    /// Cutpoints must be finite, non-negative and strictly descending.
    pub fn validate(&self) -> Result<(), ReviewError> {
        let cuts = [
            self.blunder,
            self.mistake,
            self.inaccuracy,
            self.slightly_accurate,
        ];
        if cuts.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(ReviewError::InvalidBands(format!(
                "cutpoints must be finite and non-negative: {:?}",
                cuts
            )));
        }
        if cuts.windows(2).any(|w| w[0] <= w[1]) {
            return Err(ReviewError::InvalidBands(format!(
                "cutpoints must be strictly descending: {:?}",
                cuts
            )));
        }
        Ok(())
    }

    /// Category for a raw swing. Brilliant, strong and missed-win moves
    /// need context the number lacks, so they never come from here.
    pub fn from_swing(&self, swing: f64) -> Classification {
        let magnitude = swing.abs();
        if magnitude > self.blunder {
            Classification::Blunder
        } else if magnitude > self.mistake {
            Classification::Mistake
        } else if magnitude > self.inaccuracy {
            Classification::Inaccuracy
        } else if magnitude > self.slightly_accurate {
            Classification::SlightlyAccurate
        } else {
            Classification::Normal
        }
    }
}

/// Classify one evaluation: a recognised gateway label wins, otherwise the swing decides.
pub fn classify(evaluation: &Evaluation, bands: &ClassificationBands) -> Classification {
    evaluation
        .classification
        .as_deref()
        .and_then(Classification::from_label)
        .unwrap_or_else(|| bands.from_swing(evaluation.swing))
}

/// Per-side classification counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub white: HashMap<Classification, u32>,
    pub black: HashMap<Classification, u32>,
}

impl ClassificationSummary {
    pub fn from_evaluations(evaluations: &[Evaluation], bands: &ClassificationBands) -> Self {
        let mut summary = Self::default();
        for (i, eval) in evaluations.iter().enumerate() {
            let side = match PieceColor::for_ply(i + 1) {
                PieceColor::White => &mut summary.white,
                PieceColor::Black => &mut summary.black,
            };
            *side.entry(classify(eval, bands)).or_insert(0) += 1;
        }
        summary
    }

    pub fn white_count(&self, class: Classification) -> u32 {
        self.white.get(&class).copied().unwrap_or(0)
    }

    pub fn black_count(&self, class: Classification) -> u32 {
        self.black.get(&class).copied().unwrap_or(0)
    }
}
