use crate::rules::ImportanceWeights;

/// Individual contributions to a file's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub format: u32,
    pub file_name: u32,
    pub path: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.base
            .saturating_add(self.format)
            .saturating_add(self.file_name)
            .saturating_add(self.path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: ImportanceWeights,
}

impl Scorer {
    pub fn new(weights: ImportanceWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ImportanceWeights {
        &self.weights
    }

    /// Score = base + format weight + filename weight + best matching path weight.
    pub fn score(&self, relative_path: &str, extension: Option<&str>) -> u32 {
        self.breakdown(relative_path, extension).total()
    }

    pub fn breakdown(&self, relative_path: &str, extension: Option<&str>) -> ScoreBreakdown {
        let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);

        ScoreBreakdown {
            base: self.weights.base,
            format: self.weights.format_weight(extension),
            file_name: self.weights.file_weight(file_name),
            path: self.weights.path_weight(relative_path),
        }
    }
}
