use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::animation::{Animation, AnimationIds, AnimationStatus};
use crate::core::primitives::{decimal_power, tolerant_ceil};
use crate::core::rounding::{
    NiceRange, adjust_with_precision, degenerate_delta, fix_small_step, settle,
};
use crate::core::scale::DomainScale;
use crate::core::sync::sync_to;
use crate::core::types::{AxisDirection, AxisId};
use crate::core::viewport::ViewportConfig;
use crate::error::{AxisError, AxisResult};

/// Floor substituted for non-positive log values when `treat_zero_as` is unset.
pub const DEFAULT_LOG_FLOOR: f64 = 1.0;

/// Spans at or below this width are widened before rounding.
const DEGENERATE_SPAN: f64 = 1e-15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AxisKind {
    /// Numeric domain, optionally logarithmic.
    #[default]
    Value,
    /// Item-indexed domain `[0, item_count]` with unit step.
    Category,
}

/// Typed axis configuration; every field has a documented default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default)]
    pub kind: AxisKind,
    /// Declared minimum overriding the data minimum.
    #[serde(default)]
    pub min: Option<f64>,
    /// Declared maximum overriding the data maximum; forces strict rounding.
    #[serde(default)]
    pub max: Option<f64>,
    /// Use the declared or real extremes verbatim, without padding.
    #[serde(default)]
    pub strict_min_max: bool,
    /// Fraction of the real span added below the minimum.
    #[serde(default)]
    pub extra_min: f64,
    /// Fraction of the real span added above the maximum.
    #[serde(default)]
    pub extra_max: f64,
    #[serde(default)]
    pub logarithmic: bool,
    /// Stand-in for values `<= 0` on logarithmic axes.
    #[serde(default)]
    pub treat_zero_as: Option<f64>,
    /// Decimal places the grid step is capped to.
    #[serde(default)]
    pub max_precision: Option<u32>,
    /// Minimum pixel distance between grid lines.
    #[serde(default = "default_min_grid_distance")]
    pub min_grid_distance: f64,
    /// Value separating positive and negative regions.
    #[serde(default)]
    pub base_value: f64,
    /// Rescale to the items visible through the base axis' selection.
    #[serde(default)]
    pub auto_zoom: bool,
    /// Axis whose grid this axis aligns to.
    #[serde(default)]
    pub sync_with: Option<AxisId>,
    #[serde(default)]
    pub inverted: bool,
    #[serde(default)]
    pub direction: AxisDirection,
    #[serde(default = "default_true")]
    pub pannable: bool,
    #[serde(default = "default_true")]
    pub zoomable: bool,
    /// Duration of the transition between old and new finals.
    #[serde(default)]
    pub interpolation_duration_ms: f64,
    #[serde(default)]
    pub viewport: ViewportConfig,
}

fn default_min_grid_distance() -> f64 {
    40.0
}

fn default_true() -> bool {
    true
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            kind: AxisKind::Value,
            min: None,
            max: None,
            strict_min_max: false,
            extra_min: 0.0,
            extra_max: 0.0,
            logarithmic: false,
            treat_zero_as: None,
            max_precision: None,
            min_grid_distance: default_min_grid_distance(),
            base_value: 0.0,
            auto_zoom: false,
            sync_with: None,
            inverted: false,
            direction: AxisDirection::Horizontal,
            pannable: true,
            zoomable: true,
            interpolation_duration_ms: 0.0,
            viewport: ViewportConfig::default(),
        }
    }
}

impl AxisConfig {
    #[must_use]
    pub fn value(direction: AxisDirection) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn category(direction: AxisDirection) -> Self {
        Self {
            kind: AxisKind::Category,
            direction,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_strict_min_max(mut self, strict_min_max: bool) -> Self {
        self.strict_min_max = strict_min_max;
        self
    }

    #[must_use]
    pub fn with_extras(mut self, extra_min: f64, extra_max: f64) -> Self {
        self.extra_min = extra_min;
        self.extra_max = extra_max;
        self
    }

    #[must_use]
    pub fn with_logarithmic(mut self, logarithmic: bool, treat_zero_as: Option<f64>) -> Self {
        self.logarithmic = logarithmic;
        self.treat_zero_as = treat_zero_as;
        self
    }

    #[must_use]
    pub fn with_max_precision(mut self, max_precision: Option<u32>) -> Self {
        self.max_precision = max_precision;
        self
    }

    #[must_use]
    pub fn with_min_grid_distance(mut self, min_grid_distance: f64) -> Self {
        self.min_grid_distance = min_grid_distance;
        self
    }

    #[must_use]
    pub fn with_base_value(mut self, base_value: f64) -> Self {
        self.base_value = base_value;
        self
    }

    #[must_use]
    pub fn with_auto_zoom(mut self, auto_zoom: bool) -> Self {
        self.auto_zoom = auto_zoom;
        self
    }

    #[must_use]
    pub fn with_sync_with(mut self, sync_with: Option<AxisId>) -> Self {
        self.sync_with = sync_with;
        self
    }

    #[must_use]
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    #[must_use]
    pub fn with_interaction(mut self, pannable: bool, zoomable: bool) -> Self {
        self.pannable = pannable;
        self.zoomable = zoomable;
        self
    }

    #[must_use]
    pub fn with_interpolation_duration_ms(mut self, duration_ms: f64) -> Self {
        self.interpolation_duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn validate(self) -> AxisResult<Self> {
        for bound in [self.min, self.max].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(AxisError::InvalidConfig(
                    "axis min/max must be finite".to_owned(),
                ));
            }
        }
        if !self.extra_min.is_finite()
            || !self.extra_max.is_finite()
            || self.extra_min < 0.0
            || self.extra_max < 0.0
        {
            return Err(AxisError::InvalidConfig(
                "axis extra min/max must be finite and >= 0".to_owned(),
            ));
        }
        if !self.min_grid_distance.is_finite() || self.min_grid_distance <= 0.0 {
            return Err(AxisError::InvalidConfig(
                "axis min grid distance must be finite and > 0".to_owned(),
            ));
        }
        if !self.base_value.is_finite() {
            return Err(AxisError::InvalidConfig(
                "axis base value must be finite".to_owned(),
            ));
        }
        if let Some(treat_zero_as) = self.treat_zero_as {
            if !treat_zero_as.is_finite() || treat_zero_as <= 0.0 {
                return Err(AxisError::InvalidConfig(
                    "axis treat_zero_as must be finite and > 0".to_owned(),
                ));
            }
        }
        if !self.interpolation_duration_ms.is_finite() || self.interpolation_duration_ms < 0.0 {
            return Err(AxisError::InvalidConfig(
                "axis interpolation duration must be finite and >= 0".to_owned(),
            ));
        }
        if self.logarithmic && self.kind == AxisKind::Category {
            return Err(AxisError::InvalidConfig(
                "category axes cannot be logarithmic".to_owned(),
            ));
        }
        self.viewport.validate()?;
        Ok(self)
    }

    #[must_use]
    pub fn log_floor(self) -> f64 {
        self.treat_zero_as.unwrap_or(DEFAULT_LOG_FLOOR)
    }
}

/// Real and rounded extremes of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub min_real: f64,
    pub max_real: f64,
    pub min_final: f64,
    pub max_final: f64,
    /// Grid step of the full domain; decades on logarithmic axes.
    pub step: f64,
}

impl Extremes {
    #[must_use]
    pub fn finals(self) -> NiceRange {
        NiceRange {
            min: self.min_final,
            max: self.max_final,
            step: self.step,
        }
    }
}

/// Upstream data feeding one extremes recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtremesInput {
    /// Union of attached series extents.
    pub series: Option<(f64, f64)>,
    /// Union of ranges flagged `affects_min_max`.
    pub ranges: Option<(f64, f64)>,
    /// Longest attached series; drives category domains.
    pub item_count: usize,
    /// Pixel length of the axis.
    pub length_px: f64,
    /// Finals of the axis this one syncs with, already recomputed.
    pub sync_target: Option<NiceRange>,
}

/// Value window currently visible through the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Previous and current state of a recomputed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Change<T> {
    pub previous: Option<T>,
    pub current: Option<T>,
}

impl<T: PartialEq> Change<T> {
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.previous != self.current
    }
}

pub type ExtremesChange = Change<Extremes>;
pub type SelectionChange = Change<Selection>;

impl ExtremesChange {
    #[must_use]
    pub fn bounds_changed(&self) -> bool {
        match (self.previous, self.current) {
            (Some(previous), Some(current)) => {
                previous.min_final != current.min_final || previous.max_final != current.max_final
            }
            (None, None) => false,
            _ => true,
        }
    }

    #[must_use]
    pub fn step_changed(&self) -> bool {
        self.previous.map(|extremes| extremes.step) != self.current.map(|extremes| extremes.step)
    }
}

/// Grid lines that fit into `length_px`.
#[must_use]
pub fn grid_count(length_px: f64, min_grid_distance: f64) -> f64 {
    if !length_px.is_finite() || length_px <= 0.0 {
        return 1.0;
    }
    (length_px / min_grid_distance).max(1.0)
}

/// Pure extremes computation; `None` is the valid "no data" state.
#[must_use]
pub fn compute_extremes(config: &AxisConfig, input: &ExtremesInput) -> Option<Extremes> {
    if config.kind == AxisKind::Category {
        if input.item_count == 0 {
            return None;
        }
        let count = input.item_count as f64;
        return Some(Extremes {
            min_real: 0.0,
            max_real: count,
            min_final: 0.0,
            max_final: count,
            step: 1.0,
        });
    }

    let data = union(input.series, input.ranges);
    let min = config.min.or(data.map(|(min, _)| min))?;
    let max = config.max.or(data.map(|(_, max)| max))?;
    if !min.is_finite() || !max.is_finite() {
        warn!(min, max, "ignoring non-finite axis extremes");
        return None;
    }
    let (min_real, max_real) = if min > max { (max, min) } else { (min, max) };
    let grid = grid_count(input.length_px, config.min_grid_distance);

    let extremes = if config.logarithmic {
        log_extremes(config, min_real, max_real, grid)
    } else {
        linear_extremes(config, min_real, max_real, grid)
    };

    match (input.sync_target, config.logarithmic) {
        (Some(target), false) => {
            let outcome = sync_to(extremes.finals(), target);
            Some(Extremes {
                min_final: outcome.range.min,
                max_final: outcome.range.max,
                step: outcome.range.step,
                ..extremes
            })
        }
        _ => Some(extremes),
    }
}

fn linear_extremes(config: &AxisConfig, min_real: f64, max_real: f64, grid: f64) -> Extremes {
    let (mut min, mut max) = (min_real, max_real);
    if max - min <= DEGENERATE_SPAN {
        let delta = degenerate_delta(max);
        min -= delta;
        max += delta;
        trace!(min, max, "widened degenerate axis domain");
    }

    if config.strict_min_max {
        let step = adjust_with_precision(min, max, grid, true, config.max_precision).step;
        return Extremes {
            min_real,
            max_real,
            min_final: min,
            max_final: max,
            step,
        };
    }

    let span = max - min;
    min -= span * config.extra_min;
    max += span * config.extra_max;

    let strict = config.max.is_some();
    let first = adjust_with_precision(min, max, grid, strict, config.max_precision);
    let settled = settle(first.min, first.max, grid, config.max_precision);
    Extremes {
        min_real,
        max_real,
        min_final: settled.min,
        max_final: settled.max,
        step: settled.step,
    }
}

fn log_extremes(config: &AxisConfig, min_real: f64, max_real: f64, grid: f64) -> Extremes {
    let floor = config.log_floor();
    let mut max = if max_real > 0.0 { max_real } else { floor * 10.0 };
    let mut min = if min_real > 0.0 { min_real } else { floor };
    if min >= max {
        min = decimal_power(max) / 10.0;
    }

    if !config.strict_min_max {
        let decades = max.log10() - min.log10();
        min = 10f64.powf(min.log10() - decades * config.extra_min);
        max = 10f64.powf(max.log10() + decades * config.extra_max);
        min = 10f64.powf(min.log10().floor());
        max = 10f64.powf(max.log10().ceil());
        if min == max {
            max *= 10.0;
        }
    }

    let decades = max.log10() - min.log10();
    let step = tolerant_ceil(decades / grid).max(1.0);
    Extremes {
        min_real,
        max_real,
        min_final: min,
        max_final: max,
        step,
    }
}

fn union(lhs: Option<(f64, f64)>, rhs: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (lhs, rhs) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => Some((a_min.min(b_min), a_max.max(b_max))),
        (Some(bounds), None) | (None, Some(bounds)) => Some(bounds),
        (None, None) => None,
    }
}

/// Numeric state of one axis: extremes, displayed finals and selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    id: AxisId,
    config: AxisConfig,
    extremes: Option<Extremes>,
    displayed: Option<(f64, f64)>,
    finals_animation: Option<(Animation, Animation)>,
    selection: Option<Selection>,
    length_px: f64,
}

impl AxisScale {
    pub fn new(id: AxisId, config: AxisConfig) -> AxisResult<Self> {
        Ok(Self {
            id,
            config: config.validate()?,
            extremes: None,
            displayed: None,
            finals_animation: None,
            selection: None,
            length_px: 0.0,
        })
    }

    #[must_use]
    pub fn id(&self) -> AxisId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    #[must_use]
    pub fn kind(&self) -> AxisKind {
        self.config.kind
    }

    /// Target extremes of the last recomputation.
    #[must_use]
    pub fn extremes(&self) -> Option<Extremes> {
        self.extremes
    }

    /// Finals currently used for mapping; lag behind targets while animating.
    #[must_use]
    pub fn displayed_finals(&self) -> Option<(f64, f64)> {
        self.displayed
    }

    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    #[must_use]
    pub fn length_px(&self) -> f64 {
        self.length_px
    }

    /// Grid step of the visible selection, falling back to the full domain.
    #[must_use]
    pub fn step(&self) -> Option<f64> {
        self.selection
            .map(|selection| selection.step)
            .or(self.extremes.map(|extremes| extremes.step))
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.finals_animation.is_some()
    }

    /// Recomputes extremes from `input` and reports the difference.
    pub fn recompute_extremes(
        &mut self,
        input: &ExtremesInput,
        now_ms: f64,
        ids: &mut AnimationIds,
    ) -> ExtremesChange {
        self.length_px = input.length_px;
        let previous = self.extremes;
        let current = compute_extremes(&self.config, input);
        self.extremes = current;

        match (self.displayed, current) {
            (Some((from_min, from_max)), Some(target))
                if self.config.interpolation_duration_ms > 0.0
                    && (from_min != target.min_final || from_max != target.max_final) =>
            {
                let duration = self.config.interpolation_duration_ms;
                self.finals_animation = Some((
                    Animation::new(ids.allocate(), from_min, target.min_final, now_ms, duration),
                    Animation::new(ids.allocate(), from_max, target.max_final, now_ms, duration),
                ));
            }
            (_, Some(target)) => {
                self.finals_animation = None;
                self.displayed = Some((target.min_final, target.max_final));
            }
            (_, None) => {
                self.finals_animation = None;
                self.displayed = None;
                self.selection = None;
            }
        }

        let change = ExtremesChange { previous, current };
        if change.is_changed() {
            debug!(
                axis = %self.id,
                min_final = current.map(|extremes| extremes.min_final),
                max_final = current.map(|extremes| extremes.max_final),
                step = current.map(|extremes| extremes.step),
                "axis extremes recomputed"
            );
        }
        change
    }

    /// Advances the finals transition. Returns whether displayed finals moved.
    pub fn tick_finals(&mut self, now_ms: f64) -> bool {
        let Some((min_animation, max_animation)) = self.finals_animation else {
            return false;
        };
        let (min, min_status) = min_animation.sample(now_ms);
        let (max, max_status) = max_animation.sample(now_ms);
        let moved = self.displayed != Some((min, max));
        self.displayed = Some((min, max));
        if min_status == AnimationStatus::Finished && max_status == AnimationStatus::Finished {
            self.finals_animation = None;
        }
        moved
    }

    /// Domain mapping over the displayed finals.
    #[must_use]
    pub fn domain_scale(&self) -> Option<DomainScale> {
        let (min, max) = self.displayed?;
        if self.config.logarithmic {
            DomainScale::logarithmic(min, max, self.config.log_floor()).ok()
        } else {
            DomainScale::linear(min, max).ok()
        }
    }

    #[must_use]
    pub fn value_to_position(&self, value: f64) -> Option<f64> {
        self.domain_scale()
            .map(|scale| scale.value_to_position(value))
    }

    #[must_use]
    pub fn position_to_value(&self, position: f64) -> Option<f64> {
        self.domain_scale()
            .map(|scale| scale.position_to_value(position))
    }

    /// Pixel offset of a window-relative position, honoring inversion.
    #[must_use]
    pub fn position_to_coordinate(&self, global_position: f64) -> f64 {
        let position = if self.config.inverted {
            1.0 - global_position
        } else {
            global_position
        };
        DomainScale::position_to_coordinate(position, self.length_px)
    }

    /// Configured base value clamped into the finals.
    #[must_use]
    pub fn base_value(&self) -> Option<f64> {
        let extremes = self.extremes?;
        let mut base = self.config.base_value;
        if self.config.logarithmic && base <= 0.0 {
            base = extremes.min_final;
        }
        Some(base.clamp(extremes.min_final, extremes.max_final))
    }

    /// Number of zoom units across the full domain.
    #[must_use]
    pub fn zoom_units(&self) -> f64 {
        let Some(extremes) = self.extremes else {
            return 1.0;
        };
        match self.config.kind {
            AxisKind::Category => extremes.max_final.max(1.0),
            AxisKind::Value => {
                let span = if self.config.logarithmic {
                    extremes.max_final.log10() - extremes.min_final.log10()
                } else {
                    extremes.max_final - extremes.min_final
                };
                tolerant_ceil(span / extremes.step).max(1.0)
            }
        }
    }

    /// Refreshes the visible value window for the viewport `[start, end]`.
    pub fn update_selection(&mut self, start: f64, end: f64) -> SelectionChange {
        let previous = self.selection;
        let current = self.compute_selection(start, end);
        self.selection = current;
        let change = SelectionChange { previous, current };
        if change.is_changed() {
            trace!(axis = %self.id, start, end, "axis selection updated");
        }
        change
    }

    fn compute_selection(&self, start: f64, end: f64) -> Option<Selection> {
        let extremes = self.extremes?;
        let scale = self.domain_scale()?;
        let min = scale.position_to_value(start);
        let max = scale.position_to_value(end);
        let grid = grid_count(self.length_px, self.config.min_grid_distance);
        let step = match self.config.kind {
            AxisKind::Category => tolerant_ceil((max - min) / grid).max(1.0),
            AxisKind::Value if self.config.logarithmic => {
                let decades = max.max(f64::MIN_POSITIVE).log10() - min.max(f64::MIN_POSITIVE).log10();
                tolerant_ceil(decades / grid).max(1.0)
            }
            AxisKind::Value => {
                if max - min > DEGENERATE_SPAN {
                    adjust_with_precision(min, max, grid, true, self.config.max_precision).step
                } else {
                    extremes.step
                }
            }
        };
        Some(Selection {
            min,
            max,
            step: fix_small_step(step),
        })
    }

    /// Viewport positions that fit `visible` value extremes, for auto-zoom.
    ///
    /// Returns `None` when auto-zoom is disabled or nothing is visible.
    #[must_use]
    pub fn recompute_selection_extremes(&self, visible: Option<(f64, f64)>) -> Option<(f64, f64)> {
        if !self.config.auto_zoom || self.config.kind != AxisKind::Value {
            return None;
        }
        let (min, max) = visible?;
        let extremes = self.extremes?;
        let grid = grid_count(self.length_px, self.config.min_grid_distance);
        let (min, max) = if self.config.logarithmic {
            let floor = self.config.log_floor();
            (
                10f64.powf(min.max(floor).log10().floor()),
                10f64.powf(max.max(floor).log10().ceil()),
            )
        } else if max - min <= DEGENERATE_SPAN {
            let delta = degenerate_delta(max);
            let range = settle(min - delta, max + delta, grid, self.config.max_precision);
            (range.min, range.max)
        } else {
            let range = settle(min, max, grid, self.config.max_precision);
            (range.min, range.max)
        };
        let min = min.max(extremes.min_final);
        let max = max.min(extremes.max_final);
        let target = if self.config.logarithmic {
            DomainScale::logarithmic(
                extremes.min_final,
                extremes.max_final,
                self.config.log_floor(),
            )
        } else {
            DomainScale::linear(extremes.min_final, extremes.max_final)
        }
        .ok()?;
        Some((target.value_to_position(min), target.value_to_position(max)))
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisConfig, ExtremesInput, compute_extremes, grid_count};
    use crate::core::types::AxisDirection;

    #[test]
    fn grid_count_never_drops_below_one() {
        assert_eq!(grid_count(0.0, 40.0), 1.0);
        assert_eq!(grid_count(20.0, 40.0), 1.0);
        assert_eq!(grid_count(200.0, 40.0), 5.0);
    }

    #[test]
    fn declared_bounds_replace_missing_data() {
        let config = AxisConfig::value(AxisDirection::Vertical).with_bounds(Some(0.0), Some(50.0));
        let input = ExtremesInput {
            length_px: 200.0,
            ..ExtremesInput::default()
        };
        let extremes = compute_extremes(&config, &input).expect("declared extremes");
        assert_eq!(extremes.min_real, 0.0);
        assert_eq!(extremes.max_real, 50.0);
        assert!(extremes.min_final <= 0.0 && extremes.max_final >= 50.0);
    }
}
