//! Two-stop color gradients for chart regions.
//!
//! Colors are opaque string tokens handed through to the renderer. The
//! only interpretation performed here is opacity decay, which turns a
//! highlighted gradient into the dimmed variant drawn for regions outside
//! a climb.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A color token such as `#ff8800`, `#f80c` or `rgba(255, 136, 0, 0.5)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reduce the color's alpha by `amount`, clamping the result to
    /// `[0, 1]`.
    ///
    /// A color without an alpha channel starts from full opacity. Hex
    /// colors come back as lowercase `#rrggbbaa` and `rgb()`/`rgba()`
    /// colors as `rgba(r, g, b, a)`. Anything else (named colors, CSS
    /// variables, malformed tokens) is returned unchanged, as is every
    /// color when `amount` is not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use climbprint_core::Color;
    ///
    /// assert_eq!(Color::from("#FF0000").with_decayed_opacity(0.2), "#ff0000cc");
    /// assert_eq!(Color::from("#f008").with_decayed_opacity(0.2), "#ff000055");
    /// assert_eq!(Color::from("rgb(1, 2, 3)").with_decayed_opacity(0.5), "rgba(1, 2, 3, 0.5)");
    /// assert_eq!(Color::from("tomato").with_decayed_opacity(0.2), "tomato");
    /// ```
    #[must_use]
    pub fn with_decayed_opacity(&self, amount: f64) -> Self {
        if !amount.is_finite() {
            return self.clone();
        }
        let decay = |alpha: f64| (alpha - amount).clamp(0.0, 1.0);

        let token = self.0.trim();
        if let Some(hex) = token.strip_prefix('#') {
            if let Some((rgb, alpha)) = parse_hex(hex) {
                return Self(format!("#{rgb}{}", alpha_to_hex(decay(alpha))));
            }
        } else if let Some((channels, alpha)) = parse_functional(token) {
            let [r, g, b] = channels;
            return Self(format!("rgba({r}, {g}, {b}, {})", round_alpha(decay(alpha))));
        }

        self.clone()
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Color {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Color {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a hex color body into lowercase `rrggbb` and an alpha in
/// `[0, 1]`, expanding `rgb`/`rgba` shorthand.
fn parse_hex(hex: &str) -> Option<(String, f64)> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let hex = hex.to_ascii_lowercase();
    let full: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex,
        _ => return None,
    };

    let alpha = match full.get(6..8) {
        Some(aa) => f64::from(u8::from_str_radix(aa, 16).ok()?) / 255.0,
        None => 1.0,
    };
    Some((full[..6].to_owned(), alpha))
}

/// Parse `rgb(r, g, b)` or `rgba(r, g, b, a)` into its trimmed color
/// channels and an alpha in `[0, 1]`.
fn parse_functional(token: &str) -> Option<([&str; 3], f64)> {
    let lower = token.get(..5).map(str::to_ascii_lowercase);
    let body = match lower.as_deref() {
        Some("rgba(") => &token[5..],
        _ if token.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("rgb(")) => &token[4..],
        _ => return None,
    };
    let body = body.strip_suffix(')')?;

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let (channels, alpha) = match parts.as_slice() {
        [r, g, b] => ([*r, *g, *b], 1.0),
        [r, g, b, a] => ([*r, *g, *b], parse_alpha(a)?),
        _ => return None,
    };
    if channels.iter().any(|c| c.is_empty() || c.parse::<f64>().is_err()) {
        return None;
    }
    Some((channels, alpha))
}

fn parse_alpha(token: &str) -> Option<f64> {
    let value = match token.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0,
        None => token.parse::<f64>().ok()?,
    };
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alpha_to_hex(alpha: f64) -> String {
    format!("{:02x}", (alpha * 255.0).round() as u8)
}

fn round_alpha(alpha: f64) -> f64 {
    (alpha * 1000.0).round() / 1000.0
}

/// One of the two anchors of a [`TwoStopGradient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopSide {
    Start,
    End,
}

impl StopSide {
    /// The other side.
    #[must_use]
    pub const fn sibling(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

/// A gradient with exactly two stops, either of which may be unset.
///
/// Setting one stop while the other is unset fills both, so a gradient
/// never holds one concrete color next to an unset one through
/// [`set_stop`](Self::set_stop).
///
/// Cloning yields an independent copy; callers keep a clone of the
/// initial gradient to reset user edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoStopGradient {
    start: Option<Color>,
    end: Option<Color>,
}

impl TwoStopGradient {
    /// Build a gradient from raw stops, without sibling filling.
    #[must_use]
    pub const fn new(start: Option<Color>, end: Option<Color>) -> Self {
        Self { start, end }
    }

    /// A gradient with both stops set to `color`.
    #[must_use]
    pub fn solid(color: impl Into<Color>) -> Self {
        let color = color.into();
        Self {
            start: Some(color.clone()),
            end: Some(color),
        }
    }

    /// The stored stop, `None` if it was never set or inherited.
    #[must_use]
    pub const fn stop(&self, side: StopSide) -> Option<&Color> {
        match side {
            StopSide::Start => self.start.as_ref(),
            StopSide::End => self.end.as_ref(),
        }
    }

    /// Set one stop, copying the color into the sibling if it is unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use climbprint_core::{StopSide, TwoStopGradient};
    ///
    /// let mut gradient = TwoStopGradient::default();
    /// gradient.set_stop(StopSide::Start, "#ff0000");
    /// assert_eq!(gradient.stop(StopSide::End).unwrap(), "#ff0000");
    ///
    /// gradient.set_stop(StopSide::End, "#00ff00");
    /// assert_eq!(gradient.stop(StopSide::Start).unwrap(), "#ff0000");
    /// ```
    pub fn set_stop(&mut self, side: StopSide, color: impl Into<Color>) {
        let color = color.into();
        if self.stop(side.sibling()).is_none() {
            *self.slot(side.sibling()) = Some(color.clone());
        }
        *self.slot(side) = Some(color);
    }

    /// Whether neither stop holds a color.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// The dimmed variant drawn for non-highlighted regions: every set
    /// stop has its opacity reduced by `decay`. Unset stops stay unset.
    #[must_use]
    pub fn derive_unhighlighted(&self, decay: f64) -> Self {
        Self {
            start: self.start.as_ref().map(|c| c.with_decayed_opacity(decay)),
            end: self.end.as_ref().map(|c| c.with_decayed_opacity(decay)),
        }
    }

    const fn slot(&mut self, side: StopSide) -> &mut Option<Color> {
        match side {
            StopSide::Start => &mut self.start,
            StopSide::End => &mut self.end,
        }
    }
}

/// The stroke and fill gradients of one drawable chart element.
///
/// Stroke stops always hold a color (missing ones default to
/// [`DEFAULT_STROKE`](Self::DEFAULT_STROKE)); the fill may be entirely
/// unset, meaning the element is not filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GradientStyleParts")]
pub struct GradientStyle {
    stroke: TwoStopGradient,
    fill: TwoStopGradient,
}

#[derive(Deserialize)]
struct GradientStyleParts {
    #[serde(default)]
    stroke: TwoStopGradient,
    #[serde(default)]
    fill: TwoStopGradient,
}

impl From<GradientStyleParts> for GradientStyle {
    fn from(parts: GradientStyleParts) -> Self {
        Self::new(parts.stroke, parts.fill)
    }
}

impl GradientStyle {
    pub const DEFAULT_STROKE: &'static str = "#fff";

    /// Opacity removed from highlighted colors to draw the rest of a
    /// profile.
    pub const DEFAULT_DECAY: f64 = 0.2;

    /// Build a style, filling unset stroke stops with
    /// [`DEFAULT_STROKE`](Self::DEFAULT_STROKE). The fill is kept as given.
    #[must_use]
    pub fn new(stroke: TwoStopGradient, fill: TwoStopGradient) -> Self {
        let default_stroke = || Color::from(Self::DEFAULT_STROKE);
        Self {
            stroke: TwoStopGradient {
                start: stroke.start.or_else(|| Some(default_stroke())),
                end: stroke.end.or_else(|| Some(default_stroke())),
            },
            fill,
        }
    }

    #[must_use]
    pub const fn stroke(&self) -> &TwoStopGradient {
        &self.stroke
    }

    /// The fill gradient, or `None` when neither fill stop is set.
    #[must_use]
    pub const fn fill(&self) -> Option<&TwoStopGradient> {
        if self.fill.is_unset() {
            None
        } else {
            Some(&self.fill)
        }
    }

    pub fn set_stroke_stop(&mut self, side: StopSide, color: impl Into<Color>) {
        self.stroke.set_stop(side, color);
    }

    pub fn set_fill_stop(&mut self, side: StopSide, color: impl Into<Color>) {
        self.fill.set_stop(side, color);
    }

    /// Both gradients dimmed by `decay`.
    #[must_use]
    pub fn unhighlighted(&self, decay: f64) -> Self {
        Self {
            stroke: self.stroke.derive_unhighlighted(decay),
            fill: self.fill.derive_unhighlighted(decay),
        }
    }

    /// The style to draw a chart region with: this style for highlighted
    /// regions, the [`unhighlighted`](Self::unhighlighted) variant
    /// otherwise.
    #[must_use]
    pub fn for_region(&self, highlighted: bool, decay: f64) -> Self {
        if highlighted {
            self.clone()
        } else {
            self.unhighlighted(decay)
        }
    }
}

impl Default for GradientStyle {
    fn default() -> Self {
        Self::new(TwoStopGradient::default(), TwoStopGradient::default())
    }
}
