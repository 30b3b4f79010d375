use super::{Detection, Severity};

/// Score at which a primary label counts toward the exposed tally.
const PRIMARY_COUNT_MIN: f64 = 0.2;
/// Score at which a secondary label counts toward the exposed tally.
const SECONDARY_COUNT_MIN: f64 = 0.3;
/// Score at which a primary label is treated as high exposure on its own.
const HIGH_EXPOSED_MIN: f64 = 0.5;

/// Running label scores accumulated over one detection sequence.
///
/// For every tracked label the last observed score wins, except
/// `FEMALE_BREAST_COVERED` which keeps the minimum (1.0 when never seen:
/// fully covered is the safe default).
#[derive(Debug)]
struct LabelScores {
    female_breast_exposed: f64,
    female_genitalia_exposed: f64,
    male_genitalia_exposed: f64,
    anus_exposed: f64,
    belly_exposed: f64,
    buttocks_exposed: f64,
    armpits_exposed: f64,
    feet_exposed: f64,
    female_breast_covered: f64,
    exposed_count: u32,
    has_high_exposed: bool,
}

impl Default for LabelScores {
    fn default() -> Self {
        Self {
            female_breast_exposed: 0.0,
            female_genitalia_exposed: 0.0,
            male_genitalia_exposed: 0.0,
            anus_exposed: 0.0,
            belly_exposed: 0.0,
            buttocks_exposed: 0.0,
            armpits_exposed: 0.0,
            feet_exposed: 0.0,
            female_breast_covered: 1.0,
            exposed_count: 0,
            has_high_exposed: false,
        }
    }
}

impl LabelScores {
    fn observe(&mut self, d: &Detection) {
        match d.label.as_str() {
            "FEMALE_BREAST_EXPOSED" => self.primary(d.score, |s, v| s.female_breast_exposed = v),
            "FEMALE_GENITALIA_EXPOSED" => {
                self.primary(d.score, |s, v| s.female_genitalia_exposed = v)
            }
            "MALE_GENITALIA_EXPOSED" => self.primary(d.score, |s, v| s.male_genitalia_exposed = v),
            "ANUS_EXPOSED" => self.primary(d.score, |s, v| s.anus_exposed = v),
            "BELLY_EXPOSED" => self.secondary(d.score, |s, v| s.belly_exposed = v),
            "BUTTOCKS_EXPOSED" => self.secondary(d.score, |s, v| s.buttocks_exposed = v),
            "ARMPITS_EXPOSED" => self.secondary(d.score, |s, v| s.armpits_exposed = v),
            "FEET_EXPOSED" => self.feet_exposed = d.score,
            "FEMALE_BREAST_COVERED" => {
                if d.score < self.female_breast_covered {
                    self.female_breast_covered = d.score;
                }
            }
            // Unknown labels are ignored.
            _ => {}
        }
    }

    /// Record a primary-set label occurrence: every occurrence at or above
    /// the count threshold bumps the tally, duplicates included.
    fn primary(&mut self, score: f64, set: impl FnOnce(&mut Self, f64)) {
        set(self, score);
        if score >= HIGH_EXPOSED_MIN {
            self.has_high_exposed = true;
        }
        if score >= PRIMARY_COUNT_MIN {
            self.exposed_count += 1;
        }
    }

    fn secondary(&mut self, score: f64, set: impl FnOnce(&mut Self, f64)) {
        set(self, score);
        if score >= SECONDARY_COUNT_MIN {
            self.exposed_count += 1;
        }
    }

    fn all_primary_below(&self, breast: f64, rest: f64) -> bool {
        self.female_breast_exposed < breast
            && self.female_genitalia_exposed < rest
            && self.male_genitalia_exposed < rest
            && self.anus_exposed < rest
    }
}

/// Classify an ordered detection sequence into a severity level.
///
/// Pure and total: every input, including the empty sequence, maps to a
/// level. Rule order is significant; the first matching rule wins.
pub fn classify(detections: &[Detection]) -> Severity {
    let mut scores = LabelScores::default();
    for d in detections {
        scores.observe(d);
    }

    // Explicit: any primary label at high exposure, or too many exposed hits.
    if scores.has_high_exposed || scores.exposed_count > 2 {
        return Severity::Explicit;
    }

    // Moderate: minimal clothing, with primary labels under tightened caps.
    if (scores.buttocks_exposed >= 0.5
        || (scores.belly_exposed >= 0.5 && scores.female_breast_covered < 0.4))
        && scores.all_primary_below(0.5, 0.3)
    {
        return Severity::Moderate;
    }

    // Mild: casual exposure with breast coverage holding.
    if (scores.belly_exposed >= 0.5 || scores.armpits_exposed >= 0.5 || scores.feet_exposed >= 0.5)
        && scores.female_breast_covered >= 0.4
        && scores.all_primary_below(0.3, 0.3)
    {
        return Severity::Mild;
    }

    // Safe: everything comfortably under threshold.
    if scores.all_primary_below(0.2, 0.2)
        && scores.belly_exposed < 0.3
        && scores.buttocks_exposed < 0.3
        && scores.armpits_exposed < 0.3
    {
        return Severity::Safe;
    }

    Severity::Mild
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, score: f64) -> Detection {
        Detection::new(label, score)
    }

    #[test]
    fn empty_sequence_is_safe() {
        assert_eq!(classify(&[]), Severity::Safe);
    }

    #[test]
    fn low_scores_everywhere_is_safe() {
        let input = [
            det("FEMALE_BREAST_EXPOSED", 0.1),
            det("BELLY_EXPOSED", 0.2),
            det("BUTTOCKS_EXPOSED", 0.1),
            det("ARMPITS_EXPOSED", 0.29),
        ];
        assert_eq!(classify(&input), Severity::Safe);
    }

    #[test]
    fn primary_at_half_is_explicit_inclusive_boundary() {
        let input = [det("FEMALE_BREAST_EXPOSED", 0.5)];
        assert_eq!(classify(&input), Severity::Explicit);
    }

    #[test]
    fn explicit_overrides_everything_else() {
        let input = [
            det("FEMALE_BREAST_COVERED", 0.9),
            det("MALE_GENITALIA_EXPOSED", 0.95),
            det("FEET_EXPOSED", 0.6),
        ];
        assert_eq!(classify(&input), Severity::Explicit);
    }

    #[test]
    fn three_exposed_hits_is_explicit() {
        // Three counted occurrences, none individually high.
        let input = [
            det("FEMALE_BREAST_EXPOSED", 0.25),
            det("BELLY_EXPOSED", 0.35),
            det("BUTTOCKS_EXPOSED", 0.4),
        ];
        assert_eq!(classify(&input), Severity::Explicit);
    }

    #[test]
    fn duplicate_labels_each_count_toward_tally() {
        let input = [
            det("FEMALE_BREAST_EXPOSED", 0.25),
            det("FEMALE_BREAST_EXPOSED", 0.25),
            det("FEMALE_BREAST_EXPOSED", 0.25),
        ];
        assert_eq!(classify(&input), Severity::Explicit);
    }

    #[test]
    fn exposed_buttocks_is_moderate() {
        let input = [det("BUTTOCKS_EXPOSED", 0.4), det("BUTTOCKS_EXPOSED", 0.6)];
        // Last-seen score wins; only one occurrence crossed 0.3.
        assert_eq!(classify(&input), Severity::Moderate);
    }

    #[test]
    fn belly_with_low_coverage_is_moderate() {
        let input = [
            det("BELLY_EXPOSED", 0.6),
            det("FEMALE_BREAST_COVERED", 0.3),
        ];
        assert_eq!(classify(&input), Severity::Moderate);
    }

    #[test]
    fn belly_with_good_coverage_is_mild() {
        let input = [
            det("BELLY_EXPOSED", 0.6),
            det("FEMALE_BREAST_COVERED", 0.8),
        ];
        assert_eq!(classify(&input), Severity::Mild);
    }

    #[test]
    fn feet_alone_is_mild() {
        // breastCovered defaults to 1.0 when the label never fires.
        let input = [det("FEET_EXPOSED", 0.7)];
        assert_eq!(classify(&input), Severity::Mild);
    }

    #[test]
    fn covered_default_never_blocks_safe() {
        let input = [det("FEET_EXPOSED", 0.1)];
        assert_eq!(classify(&input), Severity::Safe);
    }

    #[test]
    fn minimum_wins_for_breast_covered() {
        // A later high covered score must not undo an earlier low one.
        let input = [
            det("FEMALE_BREAST_COVERED", 0.2),
            det("FEMALE_BREAST_COVERED", 0.9),
            det("BELLY_EXPOSED", 0.6),
        ];
        assert_eq!(classify(&input), Severity::Moderate);
    }

    #[test]
    fn no_clear_category_falls_back_to_mild() {
        // Primary at 0.25: not safe (>= 0.2), not moderate/mild triggers.
        let input = [det("FEMALE_BREAST_EXPOSED", 0.25)];
        assert_eq!(classify(&input), Severity::Mild);
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let input = [det("FACE_FEMALE", 0.99), det("SOMETHING_ELSE", 1.0)];
        assert_eq!(classify(&input), Severity::Safe);
    }

    #[test]
    fn last_seen_score_wins_for_primaries() {
        // First occurrence counts, but the retained score is the last one,
        // which keeps rule 2's tightened caps satisfied.
        let input = [
            det("BUTTOCKS_EXPOSED", 0.6),
            det("FEMALE_BREAST_EXPOSED", 0.4),
            det("FEMALE_BREAST_EXPOSED", 0.1),
        ];
        assert_eq!(classify(&input), Severity::Moderate);
    }
}
