use std::io::Write;

use crate::color::{rgb_to_unit, unit_to_rgb, Rgb};
use crate::surface::{Pixel, Surface};

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLine {
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub color: Rgb,
    pub bold: bool,
}

impl OverlayLine {
    pub fn centered(row: usize, cols: usize, text: impl Into<String>, color: Rgb) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self {
            row,
            col: cols.saturating_sub(len) / 2,
            text,
            color,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

pub struct Display {
    cols: usize,
    height: usize,
    background: [f32; 3],
    composite: Vec<[f32; 3]>,
    output_buf: Vec<u8>,
}

impl Display {
    /// `height` is in pixels, i.e. twice the terminal rows.
    pub fn new(cols: usize, height: usize, background: Rgb) -> Self {
        Self {
            cols,
            height,
            background: rgb_to_unit(background),
            composite: vec![[0.0; 3]; cols * height],
            output_buf: Vec::with_capacity(cols * height * 25),
        }
    }

    pub fn resize(&mut self, cols: usize, height: usize) {
        self.cols = cols;
        self.height = height;
        self.composite.clear();
        self.composite.resize(cols * height, self.background);
    }

    pub fn cells(&self) -> (usize, usize) {
        (self.cols, self.height.div_ceil(2))
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        unit_to_rgb(self.composite[y * self.cols + x])
    }

    /// Flattens both scenes over the background and blends them, `mix` = 0
    /// showing only `winter` and 1 only `celebration`.
    pub fn compose(&mut self, winter: &[&Surface], celebration: &[&Surface], mix: f32) {
        let mix = mix.clamp(0.0, 1.0);
        let bg = Pixel::from_rgb(self.background, 1.0);

        for (idx, out) in self.composite.iter_mut().enumerate() {
            let (x, y) = (idx % self.cols, idx / self.cols);
            let flatten = |layers: &[&Surface]| {
                layers.iter().fold(bg, |acc, surface| {
                    if x < surface.width() && y < surface.height() {
                        surface.pixel(x, y).over(acc)
                    } else {
                        acc
                    }
                })
            };

            let w = if mix < 1.0 { flatten(winter) } else { bg };
            let c = if mix > 0.0 { flatten(celebration) } else { bg };
            *out = [
                w.r + (c.r - w.r) * mix,
                w.g + (c.g - w.g) * mix,
                w.b + (c.b - w.b) * mix,
            ];
        }
    }

    pub fn render<W: Write>(&mut self, out: &mut W, overlay: &[OverlayLine]) -> std::io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H"); // Move to home

        let mut prev_top: Rgb = (255, 255, 255);
        let mut prev_bot: Rgb = (255, 255, 255);
        let mut prev_bold = false;

        for y in (0..self.height).step_by(2) {
            let row = y / 2;
            let texts: Vec<&OverlayLine> = overlay.iter().filter(|l| l.row == row).collect();

            for x in 0..self.cols {
                let top = self.pixel(x, y);
                let bot = if y + 1 < self.height { self.pixel(x, y + 1) } else { top };

                let glyph = texts.iter().find_map(|line| {
                    x.checked_sub(line.col)
                        .and_then(|i| line.text.chars().nth(i))
                        .map(|c| (c, *line))
                });

                match glyph {
                    Some((c, line)) => {
                        // Text sits on the average of the two pixels it hides
                        let bg = (
                            ((top.0 as u16 + bot.0 as u16) / 2) as u8,
                            ((top.1 as u16 + bot.1 as u16) / 2) as u8,
                            ((top.2 as u16 + bot.2 as u16) / 2) as u8,
                        );
                        if line.bold != prev_bold {
                            self.output_buf
                                .extend_from_slice(if line.bold { b"\x1b[1m" } else { b"\x1b[22m" });
                            prev_bold = line.bold;
                        }
                        if bg != prev_top {
                            write!(self.output_buf, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
                            prev_top = bg;
                        }
                        if line.color != prev_bot {
                            let fg = line.color;
                            write!(self.output_buf, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
                            prev_bot = fg;
                        }
                        let mut utf8 = [0u8; 4];
                        self.output_buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                    }
                    None => {
                        if prev_bold {
                            self.output_buf.extend_from_slice(b"\x1b[22m");
                            prev_bold = false;
                        }
                        // Only emit color codes if changed
                        if top != prev_top {
                            write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                            prev_top = top;
                        }
                        if bot != prev_bot {
                            write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                            prev_bot = bot;
                        }
                        self.output_buf.extend_from_slice("▄".as_bytes());
                    }
                }
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = (255, 255, 255);
            prev_bot = (255, 255, 255);
            prev_bold = false;
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()?;
        Ok(())
    }
}
