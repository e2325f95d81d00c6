//! Dimension constraints applied when a product is measured into a project.
//!
//! Every product type has hard plausibility bounds (a door is never 300 mm
//! high). A product may narrow them through its default dimensions but never
//! widen them. All values are millimetres.
//!
//! Everything here is pure: no I/O, no state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::product::{DefaultDimensions, ProductType};

/// Inclusive `[min, max]` interval in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// True when no value can satisfy the bounds, which happens when a
    /// product's own range does not overlap its type baseline.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl core::fmt::Display for Bounds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}–{} mm", self.min, self.max)
    }
}

/// Admissible bounds for each measured dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionRanges {
    pub width: Bounds,
    pub height: Bounds,
    pub depth: Bounds,
}

/// Hard-coded plausibility bounds of a product type.
pub fn baseline(product_type: ProductType) -> DimensionRanges {
    match product_type {
        ProductType::Window => DimensionRanges {
            width: Bounds::new(300.0, 3000.0),
            height: Bounds::new(400.0, 2500.0),
            depth: Bounds::new(40.0, 200.0),
        },
        ProductType::Door => DimensionRanges {
            width: Bounds::new(600.0, 2500.0),
            height: Bounds::new(1800.0, 2800.0),
            depth: Bounds::new(40.0, 300.0),
        },
        ProductType::Gate => DimensionRanges {
            width: Bounds::new(1000.0, 6000.0),
            height: Bounds::new(1000.0, 3000.0),
            depth: Bounds::new(50.0, 400.0),
        },
        ProductType::Shutter => DimensionRanges {
            width: Bounds::new(200.0, 2000.0),
            height: Bounds::new(400.0, 3000.0),
            depth: Bounds::new(20.0, 100.0),
        },
    }
}

/// Bounds to enforce for a product of `product_type` declaring `defaults`.
///
/// Width and height take the tighter of the type baseline and the product's
/// own range. Depth comes from the baseline alone.
pub fn compute_ranges(product_type: ProductType, defaults: &DefaultDimensions) -> DimensionRanges {
    let base = baseline(product_type);
    DimensionRanges {
        width: Bounds::new(
            base.width.min.max(defaults.width_min),
            base.width.max.min(defaults.width_max),
        ),
        height: Bounds::new(
            base.height.min.max(defaults.height_min),
            base.height.max.min(defaults.height_max),
        ),
        depth: base.depth,
    }
}

/// Measured size of one configured product, in millimetres.
///
/// Fractional values are legitimate: the measurement form accepts decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: Option<f64>,
}

/// Options chosen for one configured product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub material: String,
    pub color: String,
    pub glazing: Option<String>,
    pub opening_system: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

/// What the user entered on the measurement form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementCandidate {
    pub product_type: ProductType,
    /// Type name used in messages. Defaults to `product_type`'s name.
    #[serde(default)]
    pub type_label: Option<String>,
    pub quantity: u32,
    pub dimensions: Dimensions,
    pub parameters: Parameters,
    pub notes: Option<String>,
}

impl MeasurementCandidate {
    fn label(&self) -> String {
        self.type_label
            .clone()
            .unwrap_or_else(|| self.product_type.to_string())
    }
}

/// Why a measurement was refused. The message is meant for the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("please enter the exact width")]
    MissingWidth,

    #[error("please enter the exact height")]
    MissingHeight,

    #[error("width must be between {} and {} mm for this {label}", .bounds.min, .bounds.max)]
    WidthOutOfRange {
        product_type: ProductType,
        label: String,
        bounds: Bounds,
        actual: f64,
    },

    #[error("height must be between {} and {} mm for this {label}", .bounds.min, .bounds.max)]
    HeightOutOfRange {
        product_type: ProductType,
        label: String,
        bounds: Bounds,
        actual: f64,
    },

    #[error("please select a material")]
    MissingMaterial,

    #[error("please select a color")]
    MissingColor,
}

impl Rejection {
    /// Short heading for an alert.
    pub fn title(&self) -> &'static str {
        match self {
            Rejection::MissingWidth | Rejection::MissingHeight => "Missing measurements",
            Rejection::WidthOutOfRange { .. } => "Invalid width",
            Rejection::HeightOutOfRange { .. } => "Invalid height",
            Rejection::MissingMaterial | Rejection::MissingColor => "Missing parameters",
        }
    }
}

/// Check a measurement against `ranges`.
///
/// Order matters: the first failing rule is reported. Depth, glazing, opening
/// system and quantity are never grounds for rejection, and depth is not
/// compared with `ranges.depth`.
pub fn validate(candidate: &MeasurementCandidate, ranges: &DimensionRanges) -> Result<(), Rejection> {
    let dims = &candidate.dimensions;

    if !is_entered(dims.width) {
        return Err(Rejection::MissingWidth);
    }
    if !is_entered(dims.height) {
        return Err(Rejection::MissingHeight);
    }

    if !ranges.width.contains(dims.width) {
        return Err(Rejection::WidthOutOfRange {
            product_type: candidate.product_type,
            label: candidate.label(),
            bounds: ranges.width,
            actual: dims.width,
        });
    }
    if !ranges.height.contains(dims.height) {
        return Err(Rejection::HeightOutOfRange {
            product_type: candidate.product_type,
            label: candidate.label(),
            bounds: ranges.height,
            actual: dims.height,
        });
    }

    if candidate.parameters.material.trim().is_empty() {
        return Err(Rejection::MissingMaterial);
    }
    if candidate.parameters.color.trim().is_empty() {
        return Err(Rejection::MissingColor);
    }

    Ok(())
}

/// Blank or unparsable form input arrives as zero or NaN.
fn is_entered(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn door_defaults() -> DefaultDimensions {
        DefaultDimensions {
            width_min: 600.0,
            width_max: 2500.0,
            height_min: 1800.0,
            height_max: 2800.0,
        }
    }

    fn door_candidate(width: f64, height: f64) -> MeasurementCandidate {
        MeasurementCandidate {
            product_type: ProductType::Door,
            type_label: None,
            quantity: 1,
            dimensions: Dimensions {
                width,
                height,
                depth: None,
            },
            parameters: Parameters {
                material: "PVC renforcé".to_string(),
                color: "Anthracite".to_string(),
                ..Default::default()
            },
            notes: None,
        }
    }

    #[test]
    fn door_defaults_matching_baseline_are_unchanged() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());
        assert_eq!(ranges.width, Bounds::new(600.0, 2500.0));
        assert_eq!(ranges.height, Bounds::new(1800.0, 2800.0));
        assert_eq!(ranges.depth, Bounds::new(40.0, 300.0));
    }

    #[test]
    fn door_in_range_is_accepted() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());
        assert_eq!(validate(&door_candidate(900.0, 2100.0), &ranges), Ok(()));
    }

    #[test]
    fn zero_width_is_reported_as_missing() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());
        let err = validate(&door_candidate(0.0, 2100.0), &ranges).unwrap_err();
        assert_eq!(err, Rejection::MissingWidth);
        assert!(err.to_string().contains("width"));
        assert_eq!(err.title(), "Missing measurements");
    }

    #[test]
    fn negative_height_is_reported_as_missing() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());
        let err = validate(&door_candidate(900.0, -5.0), &ranges).unwrap_err();
        assert_eq!(err, Rejection::MissingHeight);
    }

    #[test]
    fn oversized_door_cites_both_bounds() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());
        let err = validate(&door_candidate(5000.0, 2100.0), &ranges).unwrap_err();

        assert_eq!(
            err,
            Rejection::WidthOutOfRange {
                product_type: ProductType::Door,
                label: "door".to_string(),
                bounds: Bounds::new(600.0, 2500.0),
                actual: 5000.0,
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("600"), "{msg}");
        assert!(msg.contains("2500"), "{msg}");
        assert!(msg.contains("door"), "{msg}");
    }

    #[test]
    fn out_of_range_message_names_the_stored_type() {
        let ranges = compute_ranges(ProductType::Window, &door_defaults());
        let mut candidate = door_candidate(5000.0, 2100.0);
        candidate.product_type = ProductType::Window;
        candidate.type_label = Some("veranda".to_string());

        let err = validate(&candidate, &ranges).unwrap_err();
        assert!(err.to_string().ends_with("for this veranda"), "{err}");
        assert!(matches!(
            err,
            Rejection::WidthOutOfRange { product_type: ProductType::Window, .. }
        ));
    }

    #[test]
    fn bounds_are_inclusive() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());
        assert!(validate(&door_candidate(600.0, 1800.0), &ranges).is_ok());
        assert!(validate(&door_candidate(2500.0, 2800.0), &ranges).is_ok());
        assert!(validate(&door_candidate(2501.0, 2800.0), &ranges).is_err());
        assert!(matches!(
            validate(&door_candidate(2500.0, 2801.0), &ranges),
            Err(Rejection::HeightOutOfRange { .. })
        ));
    }

    #[test]
    fn fractional_measurements_are_not_rounded() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());
        assert!(validate(&door_candidate(1200.5, 2099.9), &ranges).is_ok());

        let err = validate(&door_candidate(2500.4, 2100.0), &ranges).unwrap_err();
        assert!(matches!(err, Rejection::WidthOutOfRange { actual, .. } if actual == 2500.4));
    }

    #[test]
    fn unparsable_measurement_counts_as_missing() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());
        assert_eq!(
            validate(&door_candidate(f64::NAN, 2100.0), &ranges),
            Err(Rejection::MissingWidth)
        );
        assert_eq!(
            validate(&door_candidate(900.0, f64::INFINITY), &ranges),
            Err(Rejection::MissingHeight)
        );
    }

    #[test]
    fn blank_material_then_color_are_rejected() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());

        let mut candidate = door_candidate(900.0, 2100.0);
        candidate.parameters.material = "   ".to_string();
        assert_eq!(validate(&candidate, &ranges), Err(Rejection::MissingMaterial));

        candidate.parameters.material = "Aluminium".to_string();
        candidate.parameters.color = String::new();
        assert_eq!(validate(&candidate, &ranges), Err(Rejection::MissingColor));
    }

    #[test]
    fn depth_outside_baseline_is_not_checked() {
        let ranges = compute_ranges(ProductType::Door, &door_defaults());
        let mut candidate = door_candidate(900.0, 2100.0);
        candidate.dimensions.depth = Some(10_000.0);
        candidate.quantity = 0;
        assert!(validate(&candidate, &ranges).is_ok());
    }

    #[test]
    fn narrower_product_range_wins_but_never_exceeds_baseline() {
        let defaults = DefaultDimensions {
            width_min: 100.0,
            width_max: 1200.0,
            height_min: 500.0,
            height_max: 9000.0,
        };
        let ranges = compute_ranges(ProductType::Window, &defaults);
        assert_eq!(ranges.width, Bounds::new(300.0, 1200.0));
        assert_eq!(ranges.height, Bounds::new(500.0, 2500.0));
    }

    #[test]
    fn missing_product_range_leaves_nothing_admissible() {
        let ranges = compute_ranges(ProductType::Shutter, &DefaultDimensions::default());
        assert!(ranges.width.is_empty());
        assert!(ranges.height.is_empty());
    }

    #[test]
    fn bounds_display_with_unit() {
        assert_eq!(Bounds::new(600.0, 2500.0).to_string(), "600–2500 mm");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_type() -> impl Strategy<Value = ProductType> {
            prop::sample::select(ProductType::ALL.to_vec())
        }

        fn any_defaults() -> impl Strategy<Value = DefaultDimensions> {
            let mm = || 0.0..8000.0f64;
            (mm(), mm(), mm(), mm()).prop_map(|(a, b, c, d)| DefaultDimensions {
                width_min: a,
                width_max: b,
                height_min: c,
                height_max: d,
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                .. ProptestConfig::default()
            })]

            #[test]
            fn ranges_are_tightest_of_baseline_and_defaults(ty in any_type(), defaults in any_defaults()) {
                let base = baseline(ty);
                let ranges = compute_ranges(ty, &defaults);

                prop_assert_eq!(ranges.width.min, base.width.min.max(defaults.width_min));
                prop_assert_eq!(ranges.width.max, base.width.max.min(defaults.width_max));
                prop_assert_eq!(ranges.height.min, base.height.min.max(defaults.height_min));
                prop_assert_eq!(ranges.height.max, base.height.max.min(defaults.height_max));
                prop_assert_eq!(ranges.depth, base.depth);
            }

            #[test]
            fn non_positive_dimensions_are_always_missing(
                ty in any_type(),
                defaults in any_defaults(),
                width in -5000.0..=0.0f64,
                height in -5000.0..6000.0f64,
            ) {
                let ranges = compute_ranges(ty, &defaults);
                let candidate = MeasurementCandidate {
                    product_type: ty,
                    type_label: None,
                    quantity: 1,
                    dimensions: Dimensions { width, height, depth: None },
                    parameters: Parameters::default(),
                    notes: None,
                };
                prop_assert_eq!(validate(&candidate, &ranges), Err(Rejection::MissingWidth));

                let candidate = MeasurementCandidate {
                    dimensions: Dimensions { width: 1000.0, height: width, depth: None },
                    ..candidate
                };
                prop_assert_eq!(validate(&candidate, &ranges), Err(Rejection::MissingHeight));
            }

            #[test]
            fn accepted_iff_in_range_and_parameters_present(
                ty in any_type(),
                defaults in any_defaults(),
                width in 0.5..7000.0f64,
                height in 0.5..7000.0f64,
                material in prop::option::of("[A-Za-z]{1,8}"),
                color in prop::option::of("[A-Za-z]{1,8}"),
            ) {
                let ranges = compute_ranges(ty, &defaults);
                let expected = ranges.width.contains(width)
                    && ranges.height.contains(height)
                    && material.is_some()
                    && color.is_some();

                let candidate = MeasurementCandidate {
                    product_type: ty,
                    type_label: None,
                    quantity: 1,
                    dimensions: Dimensions { width, height, depth: None },
                    parameters: Parameters {
                        material: material.unwrap_or_default(),
                        color: color.unwrap_or_default(),
                        ..Default::default()
                    },
                    notes: None,
                };

                prop_assert_eq!(validate(&candidate, &ranges).is_ok(), expected);
            }
        }
    }
}
