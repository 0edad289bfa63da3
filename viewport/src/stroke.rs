//! Adaptive stroke-width floor.
//!
//! Drawings declare a base minimum line width in their stylesheet through the
//! `--tmsMinLineWidth` custom property. As the user zooms, the controller
//! recomputes the floor after a quiet period and publishes it on the
//! [`RenderContext`] the surfaces paint with.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use std::time::Duration;

use crate::consts::{DEFAULT_MIN_LINE_WIDTH, LINE_WIDTH_PROPERTY, STROKE_DEBOUNCE};
use crate::doc::SvgDocument;
use crate::surface::RenderContext;
use crate::timer::Debounce;

/// Scale at which content of size `content` exactly fits `container`.
///
/// Degenerate sizes on either side fall back to `1.0`.
#[must_use]
pub fn natural_fit(container: (f64, f64), content: Option<(f64, f64)>) -> f64 {
    let Some((cw, ch)) = content else {
        return 1.0;
    };
    let (vw, vh) = container;
    if cw <= 0.0 || ch <= 0.0 || vw <= 0.0 || vh <= 0.0 {
        return 1.0;
    }
    (vw / cw).min(vh / ch)
}

/// The floor for a given zoom: `min(base, base / (scale * natural_k))`.
#[must_use]
pub fn floor_for(base: f64, scale: f64, natural_k: f64) -> f64 {
    let effective = scale * natural_k;
    if effective <= 0.0 || !effective.is_finite() {
        return base;
    }
    base.min(base / effective)
}

/// Base line width declared by the drawing, or the default.
#[must_use]
pub fn base_line_width(doc: &SvgDocument) -> f64 {
    declared_width(&doc.style_text()).unwrap_or(DEFAULT_MIN_LINE_WIDTH)
}

/// First `--tmsMinLineWidth: <n>;` declaration in `css` with a usable value.
#[must_use]
pub fn declared_width(css: &str) -> Option<f64> {
    let mut rest = css;
    while let Some(pos) = rest.find(LINE_WIDTH_PROPERTY) {
        rest = &rest[pos + LINE_WIDTH_PROPERTY.len()..];
        let Some(value) = rest.trim_start().strip_prefix(':') else {
            continue;
        };
        let end = value.find([';', '}']).unwrap_or(value.len());
        if let Some(width) = leading_number(&value[..end]) {
            if width.is_finite() && width > 0.0 {
                return Some(width);
            }
        }
    }
    None
}

/// The longest numeric prefix of `raw`, so `1.5px` reads as `1.5`.
fn leading_number(raw: &str) -> Option<f64> {
    let raw = raw.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in raw.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            '0'..='9' => seen_digit = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    match raw[..end].parse() {
        Ok(n) => Some(n),
        Err(_) => None,
    }
}

/// Bake `width` into a stylesheet: rewrite the custom property declarations
/// and replace every `var(--tmsMinLineWidth ...)` reference with the literal.
#[must_use]
pub fn substitute_width(css: &str, width: f64) -> String {
    let value = width.to_string();
    replace_declarations(&replace_var_refs(css, &value), &value)
}

fn replace_var_refs(css: &str, value: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(pos) = rest.find("var(") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 4..];
        match tail.find(')') {
            Some(end) if tail[..end].split(',').next().map(str::trim) == Some(LINE_WIDTH_PROPERTY) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            _ => {
                out.push_str("var(");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn replace_declarations(css: &str, value: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(pos) = rest.find(LINE_WIDTH_PROPERTY) {
        let name_end = pos + LINE_WIDTH_PROPERTY.len();
        out.push_str(&rest[..name_end]);
        let after = &rest[name_end..];
        if let Some(decl) = after.trim_start().strip_prefix(':') {
            let end = decl.find([';', '}']).unwrap_or(decl.len());
            out.push_str(": ");
            out.push_str(value);
            rest = &decl[end..];
        } else {
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

/// Debounced recomputation of the stroke floor.
#[derive(Debug, Clone)]
pub struct StrokeWidthController {
    base: f64,
    natural_k: f64,
    published: f64,
    debounce: Debounce,
}

impl Default for StrokeWidthController {
    fn default() -> Self {
        Self::new(STROKE_DEBOUNCE)
    }
}

impl StrokeWidthController {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            base: DEFAULT_MIN_LINE_WIDTH,
            natural_k: 1.0,
            published: DEFAULT_MIN_LINE_WIDTH,
            debounce: Debounce::new(quiet),
        }
    }

    /// Start over for a freshly loaded drawing and publish the base width.
    pub fn reset(&mut self, base: f64, natural_k: f64, ctx: &mut RenderContext) {
        self.base = base;
        self.natural_k = natural_k;
        self.published = base;
        self.debounce.cancel();
        ctx.min_line_width = base;
    }

    pub fn set_natural_k(&mut self, natural_k: f64) {
        self.natural_k = natural_k;
    }

    #[must_use]
    pub fn base(&self) -> f64 {
        self.base
    }

    #[must_use]
    pub fn natural_k(&self) -> f64 {
        self.natural_k
    }

    #[must_use]
    pub fn published(&self) -> f64 {
        self.published
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.debounce.deadline()
    }

    /// Note a transform change; recomputation waits for the quiet period.
    pub fn schedule(&mut self, now: Duration) {
        self.debounce.schedule(now);
    }

    /// Recompute if the quiet period has elapsed. Returns the new width when
    /// the published value changed.
    pub fn poll(&mut self, now: Duration, scale: f64, ctx: &mut RenderContext) -> Option<f64> {
        self.debounce.fire(now)?;
        let width = floor_for(self.base, scale, self.natural_k);
        tracing::debug!(width, scale, natural_k = self.natural_k, "stroke floor recomputed");
        if (width - self.published).abs() <= f64::EPSILON {
            return None;
        }
        self.published = width;
        ctx.min_line_width = width;
        Some(width)
    }
}
