//! Segmentation masks and the policy that picks which ones to stage.

use serde::{Deserialize, Serialize};

/// Category substring that marks a mask as covering furniture.
pub const FURNISHING_CATEGORY: &str = "furnishing";

/// One labelled region returned by the provider's segmentation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    #[serde(default)]
    pub category: String,
    pub url: String,
    /// Share of the image covered by the mask. Missing values count as zero.
    #[serde(default)]
    pub area_percent: f64,
}

/// Decides which masks are forwarded to the generation request.
///
/// Returns mask URLs in the order they should be sent. An empty result means
/// nothing suitable was found.
pub trait MaskSelectionPolicy: Send + Sync {
    fn select(&self, masks: &[Mask]) -> Vec<String>;
}

/// Prefer every furnishing mask; otherwise fall back to the single largest
/// mask by area.
#[derive(Debug, Default, Clone, Copy)]
pub struct FurnishingFirst;

impl MaskSelectionPolicy for FurnishingFirst {
    fn select(&self, masks: &[Mask]) -> Vec<String> {
        let furnishing: Vec<String> = masks
            .iter()
            .filter(|m| m.category.contains(FURNISHING_CATEGORY))
            .map(|m| m.url.clone())
            .collect();
        if !furnishing.is_empty() {
            return furnishing;
        }

        // First mask wins ties, matching a stable descending sort.
        masks
            .iter()
            .fold(None::<&Mask>, |best, m| match best {
                Some(b) if b.area_percent >= m.area_percent => Some(b),
                _ => Some(m),
            })
            .map(|m| vec![m.url.clone()])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(category: &str, url: &str, area: f64) -> Mask {
        Mask {
            category: category.into(),
            url: url.into(),
            area_percent: area,
        }
    }

    #[test]
    fn furnishing_mask_beats_larger_wall() {
        let masks = [mask("furnishing", "f", 10.0), mask("wall", "w", 90.0)];
        assert_eq!(FurnishingFirst.select(&masks), vec!["f".to_string()]);
    }

    #[test]
    fn largest_area_when_no_furnishing() {
        let masks = [mask("wall", "w", 30.0), mask("floor", "fl", 70.0)];
        assert_eq!(FurnishingFirst.select(&masks), vec!["fl".to_string()]);
    }

    #[test]
    fn all_furnishing_masks_are_kept_in_order() {
        let masks = [
            mask("furnishing_sofa", "m1", 40.0),
            mask("wall", "w", 50.0),
            mask("furnishing_table", "m2", 5.0),
        ];
        assert_eq!(
            FurnishingFirst.select(&masks),
            vec!["m1".to_string(), "m2".to_string()]
        );
    }

    #[test]
    fn tie_on_area_keeps_first() {
        let masks = [mask("wall", "a", 50.0), mask("floor", "b", 50.0)];
        assert_eq!(FurnishingFirst.select(&masks), vec!["a".to_string()]);
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(FurnishingFirst.select(&[]).is_empty());
    }

    #[test]
    fn missing_area_deserializes_as_zero() {
        let m: Mask = serde_json::from_str(r#"{"category":"wall","url":"u"}"#).unwrap();
        assert_eq!(m.area_percent, 0.0);
    }
}
