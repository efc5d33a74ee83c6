//! Continuous color scale over the YlGnBu ramp, with a linear and a
//! log10(v + 1) mode, plus the legend descriptor handed to the map view.

use crate::data::Metric;
use crate::slice::MetricSlice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The 9-stop YlGnBu ramp, light to dark.
pub const YL_GN_BU: [Rgb; 9] = [
    Rgb::new(0xff, 0xff, 0xd9),
    Rgb::new(0xed, 0xf8, 0xb1),
    Rgb::new(0xc7, 0xe9, 0xb4),
    Rgb::new(0x7f, 0xcd, 0xbb),
    Rgb::new(0x41, 0xb6, 0xc4),
    Rgb::new(0x1d, 0x91, 0xc0),
    Rgb::new(0x22, 0x5e, 0xa8),
    Rgb::new(0x25, 0x34, 0x94),
    Rgb::new(0x08, 0x1d, 0x58),
];

/// Fill for features with no value in the current slice. Not a ramp color,
/// so "no data" stays distinguishable from "lowest value".
pub const NO_DATA: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);

/// Feature border color.
pub const BORDER: Rgb = Rgb::new(0x33, 0x33, 0x33);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    Linear,
    Log,
}

impl ScaleMode {
    /// Value to ramp space. The +1 offset keeps zero in the log domain.
    pub fn transform(self, v: f64) -> f64 {
        match self {
            ScaleMode::Linear => v,
            ScaleMode::Log => (v + 1.0).log10(),
        }
    }

    /// Ramp space back to original units.
    pub fn invert(self, t: f64) -> f64 {
        match self {
            ScaleMode::Linear => t,
            ScaleMode::Log => 10f64.powf(t) - 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScaleMode::Linear => "linear",
            ScaleMode::Log => "log",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ScaleMode::Linear => ScaleMode::Log,
            ScaleMode::Log => ScaleMode::Linear,
        }
    }
}

/// Piecewise-linear interpolation along the ramp; `frac` is clamped to
/// [0, 1].
pub fn ramp(frac: f64) -> Rgb {
    let f = if frac.is_finite() { frac.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = f * (YL_GN_BU.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(YL_GN_BU.len() - 2);
    let t = scaled - i as f64;
    let (a, b) = (YL_GN_BU[i], YL_GN_BU[i + 1]);
    Rgb::new(
        lerp(a.r, b.r, t),
        lerp(a.g, b.g, t),
        lerp(a.b, b.b, t),
    )
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
}

/// Monotonic value-to-color function over the slice's range. Total on the
/// closed domain; out-of-domain values clamp to the ramp extremes. An
/// empty slice degrades to the neutral no-data color and a zero-width
/// domain to a single ramp color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    domain: Option<(f64, f64)>,
    mode: ScaleMode,
}

impl ColorScale {
    pub fn build(slice: &MetricSlice, mode: ScaleMode) -> Self {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in slice.values() {
            let t = mode.transform(v);
            lo = lo.min(t);
            hi = hi.max(t);
        }
        let domain = (lo.is_finite() && hi.is_finite()).then_some((lo, hi));
        Self { domain, mode }
    }

    /// Domain bounds in transformed (ramp) space; `None` for an empty slice.
    pub fn domain(&self) -> Option<(f64, f64)> {
        self.domain
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    /// Color for a raw metric value.
    pub fn color_for(&self, value: f64) -> Rgb {
        match self.domain {
            None => NO_DATA,
            Some((lo, hi)) if hi <= lo => ramp(0.5),
            Some((lo, hi)) => ramp((self.mode.transform(value) - lo) / (hi - lo)),
        }
    }

    pub fn legend(&self, metric: Metric, year: i32) -> Legend {
        Legend {
            caption: format!("{} ({}, {} scale)", metric.label(), year, self.mode.label()),
            domain: self.domain,
            mode: self.mode,
        }
    }
}

/// What the map view needs to draw the color key: caption, domain bounds
/// and a tick-label function that reports original units.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub caption: String,
    pub domain: Option<(f64, f64)>,
    mode: ScaleMode,
}

impl Legend {
    /// `count` evenly spaced ticks as (ramp fraction, label) pairs. Empty
    /// for an empty domain.
    pub fn ticks(&self, count: usize) -> Vec<(f64, String)> {
        let Some((lo, hi)) = self.domain else {
            return Vec::new();
        };
        if count < 2 {
            return vec![(0.0, self.format_tick(lo))];
        }
        (0..count)
            .map(|i| {
                let frac = i as f64 / (count - 1) as f64;
                (frac, self.format_tick(lo + frac * (hi - lo)))
            })
            .collect()
    }

    /// Label for a transformed-space position. Log mode inverts back to
    /// original units so the user never sees log values.
    pub fn format_tick(&self, t: f64) -> String {
        match self.mode {
            ScaleMode::Linear => format_magnitude(t),
            ScaleMode::Log => group_digits(self.mode.invert(t)),
        }
    }
}

/// Abbreviated display for axis ticks and info panels: billions and
/// millions get a suffix, the rest keeps digit grouping.
pub fn format_magnitude(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1.0 {
        group_digits(v)
    } else {
        format!("{v:.2}")
    }
}

/// Rounds to an integer and inserts thousands separators.
pub fn group_digits(v: f64) -> String {
    if !v.is_finite() {
        return String::from("-");
    }
    let neg = v < 0.0;
    let digits = format!("{:.0}", v.abs());
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if neg { format!("-{out}") } else { out }
}
