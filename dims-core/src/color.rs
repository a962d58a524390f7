/// Ordered list of reference colors sampled by a normalized position.
#[derive(Debug, Clone, Copy)]
pub struct ColorRamp {
    stops: &'static [[f64; 3]],
}

/// Blue to green ramp with roughly constant perceived lightness, used for
/// object fills.
pub const WINTER_ISO: ColorRamp = ColorRamp::new(&[
    [0.0, 96.0, 255.0],
    [0.0, 112.0, 230.0],
    [0.0, 125.0, 204.0],
    [0.0, 136.0, 178.0],
    [0.0, 145.0, 153.0],
    [0.0, 153.0, 127.0],
    [0.0, 160.0, 102.0],
    [0.0, 166.0, 76.0],
    [0.0, 172.0, 51.0],
]);

impl ColorRamp {
    /// `stops` must hold at least two colors.
    pub const fn new(stops: &'static [[f64; 3]]) -> Self {
        assert!(stops.len() >= 2);
        Self { stops }
    }

    pub fn stops(&self) -> &[[f64; 3]] {
        self.stops
    }

    /// Linear interpolation between the two stops bracketing `t`, with `t`
    /// clamped to `[0, 1]`.
    pub fn sample(&self, t: f64) -> [f64; 3] {
        let last = self.stops.len() - 1;
        let scaled = t.clamp(0.0, 1.0) * last as f64;
        let lower = (scaled.floor() as usize).min(last - 1);
        let frac = scaled - lower as f64;
        let (a, b) = (self.stops[lower], self.stops[lower + 1]);
        [
            a[0] + (b[0] - a[0]) * frac,
            a[1] + (b[1] - a[1]) * frac,
            a[2] + (b[2] - a[2]) * frac,
        ]
    }

    /// Opaque 8-bit color at `t`.
    pub fn sample_rgba(&self, t: f64) -> [u8; 4] {
        let [r, g, b] = self.sample(t);
        [channel(r), channel(g), channel(b), 255]
    }
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Parses any CSS color: hex, named colors, `rgb()`, `rgba()`, `hsl()`,
/// `hwb()` and `transparent`.
pub fn parse_color(s: &str) -> Option<[u8; 4]> {
    csscolorparser::parse(s.trim()).ok().map(|c| c.to_rgba8())
}
