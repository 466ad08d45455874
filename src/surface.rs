#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pixel {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Pixel {
    pub const CLEAR: Pixel = Pixel { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub fn from_rgb(rgb: [f32; 3], alpha: f32) -> Self {
        let a = alpha.clamp(0.0, 1.0);
        Self {
            r: rgb[0] * a,
            g: rgb[1] * a,
            b: rgb[2] * a,
            a,
        }
    }

    fn scaled(self, k: f32) -> Self {
        Self {
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
            a: self.a * k,
        }
    }

    pub fn over(self, dst: Pixel) -> Pixel {
        let k = 1.0 - self.a;
        Pixel {
            r: self.r + dst.r * k,
            g: self.g + dst.g * k,
            b: self.b + dst.b * k,
            a: self.a + dst.a * k,
        }
    }

    fn lighter(self, dst: Pixel) -> Pixel {
        Pixel {
            r: (self.r + dst.r).min(1.0),
            g: (self.g + dst.g).min(1.0),
            b: (self.b + dst.b).min(1.0),
            a: (self.a + dst.a).min(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    SourceOver,
    Lighter,
}

/// One stop of a radial gradient: offset along the radius, colour, opacity.
#[derive(Debug, Clone, Copy)]
pub struct GradientStop {
    pub offset: f32,
    pub rgb: [f32; 3],
    pub alpha: f32,
}

pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::CLEAR; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * self.width + x]
    }

    #[cfg(test)]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, Pixel::CLEAR);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Pixel::CLEAR);
    }

    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| p.a == 0.0)
    }

    pub fn wash(&mut self, rgb: [f32; 3], alpha: f32) {
        let src = Pixel::from_rgb(rgb, alpha);
        for p in &mut self.pixels {
            *p = src.over(*p);
        }
    }

    fn blend(&mut self, x: usize, y: usize, src: Pixel, mode: BlendMode) {
        let idx = y * self.width + x;
        let dst = self.pixels[idx];
        self.pixels[idx] = match mode {
            BlendMode::SourceOver => src.over(dst),
            BlendMode::Lighter => src.lighter(dst),
        };
    }

    fn bounds(&self, cx: f32, cy: f32, radius: f32) -> Option<(usize, usize, usize, usize)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let x0 = (cx - radius).floor().max(0.0);
        let y0 = (cy - radius).floor().max(0.0);
        let x1 = (cx + radius).ceil().min(self.width as f32 - 1.0);
        let y1 = (cy + radius).ceil().min(self.height as f32 - 1.0);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    /// Circles smaller than a pixel would vanish; draw them into the
    /// containing pixel with their area as coverage.
    fn dot(&mut self, cx: f32, cy: f32, radius: f32, src: Pixel, mode: BlendMode) {
        if cx < 0.0 || cy < 0.0 {
            return;
        }
        let (x, y) = (cx as usize, cy as usize);
        if x < self.width && y < self.height {
            let coverage = (std::f32::consts::PI * radius * radius).min(1.0);
            self.blend(x, y, src.scaled(coverage), mode);
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, rgb: [f32; 3], alpha: f32, mode: BlendMode) {
        if alpha <= 0.0 || radius <= 0.0 {
            return;
        }
        let src = Pixel::from_rgb(rgb, alpha);
        let Some((x0, y0, x1, y1)) = self.bounds(cx, cy, radius) else {
            return;
        };

        let mut hit = false;
        let r2 = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(x, y, src, mode);
                    hit = true;
                }
            }
        }
        if !hit {
            self.dot(cx, cy, radius, src, mode);
        }
    }

    /// Fills a circle whose colour is interpolated between `stops` by the
    /// distance from the centre. Stops must be sorted by offset.
    pub fn radial_gradient(&mut self, cx: f32, cy: f32, radius: f32, stops: &[GradientStop], mode: BlendMode) {
        if radius <= 0.0 || stops.is_empty() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.bounds(cx, cy, radius) else {
            return;
        };

        let mut hit = false;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let t = (dx * dx + dy * dy).sqrt() / radius;
                if t > 1.0 {
                    continue;
                }
                let src = sample_gradient(stops, t);
                if src.a > 0.0 {
                    self.blend(x, y, src, mode);
                }
                hit = true;
            }
        }
        if !hit {
            self.dot(cx, cy, radius, sample_gradient(stops, 0.0), mode);
        }
    }
}

fn sample_gradient(stops: &[GradientStop], t: f32) -> Pixel {
    let first = stops[0];
    if t <= first.offset {
        return Pixel::from_rgb(first.rgb, first.alpha);
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            let k = (t - a.offset) / span;
            let lerp = |u: f32, v: f32| u + (v - u) * k;
            let rgb = [lerp(a.rgb[0], b.rgb[0]), lerp(a.rgb[1], b.rgb[1]), lerp(a.rgb[2], b.rgb[2])];
            return Pixel::from_rgb(rgb, lerp(a.alpha, b.alpha));
        }
    }
    let last = stops[stops.len() - 1];
    Pixel::from_rgb(last.rgb, last.alpha)
}
