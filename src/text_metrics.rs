use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.face(font_family)?.measure_width(text, font_size)
}

/// Streams the outlines of `text` set on a single line into `sink`, in pixel
/// units: the pen starts at `origin_x`, the alphabetic baseline is `y = 0`
/// and y grows downwards. Returns the advance width, or `None` when no font
/// matching `font_family` is available.
pub fn outline_text(
    text: &str,
    font_size: f32,
    font_family: &str,
    origin_x: f32,
    sink: &mut dyn OutlineBuilder,
) -> Option<f32> {
    if font_size <= 0.0 {
        return None;
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.face(font_family)?.outline(text, font_size, origin_x, sink)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn face(&mut self, font_family: &str) -> Option<&mut FontFace> {
        let family_key = normalize_family_key(font_family);
        if !self.cache.contains_key(&family_key) {
            let face = self.load_face(font_family);
            if face.is_none() {
                tracing::debug!(font_family, "no font face found, using fallback metrics");
            }
            self.cache.insert(family_key.clone(), face);
        }
        self.cache
            .get_mut(&family_key)
            .and_then(|face| face.as_mut())
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let family_key = normalize_family_key(font_family);
        if let Some(face) = load_cached_face(&family_key) {
            return Some(face);
        }
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(fontdb::Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            let lower = raw.to_ascii_lowercase();
            match lower.as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" => order.push(FamilyToken::Generic(Family::SansSerif)),
                "monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "ui-monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
                _ => {
                    let idx = names.len();
                    names.push(raw.to_string());
                    order.push(FamilyToken::Name(idx));
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }

        let mut families: Vec<Family<'_>> = Vec::with_capacity(order.len());
        for token in order {
            match token {
                FamilyToken::Generic(family) => families.push(family),
                FamilyToken::Name(idx) => families.push(Family::Name(names[idx].as_str())),
            }
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            let bytes = data.to_vec();
            if let Ok(face) = Face::parse(&bytes, index) {
                let units_per_em = face.units_per_em().max(1);
                if let Some((font_path, meta_path)) = cache_paths(&family_key)
                    && !font_path.exists()
                {
                    if let Some(parent) = font_path.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    let _ = fs::write(&font_path, &bytes);
                    let _ = fs::write(&meta_path, index.to_string());
                }
                loaded = Some(FontFace::new(bytes, index, units_per_em));
            }
        });
        loaded
    }
}

struct FontFace {
    _data: Vec<u8>,
    _index: u32,
    units_per_em: u16,
    face: Option<Face<'static>>,
    glyph_cache: HashMap<char, Option<u16>>,
    advance_cache: HashMap<u16, u16>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32, units_per_em: u16) -> Self {
        let face = Face::parse(&data, index)
            .ok()
            .map(|parsed| unsafe { std::mem::transmute::<Face<'_>, Face<'static>>(parsed) });
        Self {
            _data: data,
            _index: index,
            units_per_em,
            face,
            glyph_cache: HashMap::new(),
            advance_cache: HashMap::new(),
        }
    }

    fn glyph(&mut self, ch: char) -> Option<u16> {
        if let Some(cached) = self.glyph_cache.get(&ch) {
            return *cached;
        }
        let glyph = self
            .face
            .as_ref()
            .and_then(|face| face.glyph_index(ch))
            .map(|id| id.0);
        self.glyph_cache.insert(ch, glyph);
        glyph
    }

    fn advance(&mut self, glyph_id: u16) -> u16 {
        if let Some(value) = self.advance_cache.get(&glyph_id) {
            return *value;
        }
        let value = self
            .face
            .as_ref()
            .and_then(|face| face.glyph_hor_advance(GlyphId(glyph_id)))
            .unwrap_or(0);
        self.advance_cache.insert(glyph_id, value);
        value
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        self.face.as_ref()?;
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            match self.glyph(ch) {
                Some(glyph_id) => width += self.advance(glyph_id) as f32 * scale,
                None => width += fallback,
            }
        }
        Some(width.max(0.0))
    }

    fn outline(
        &mut self,
        text: &str,
        font_size: f32,
        origin_x: f32,
        sink: &mut dyn OutlineBuilder,
    ) -> Option<f32> {
        self.face.as_ref()?;
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;
        let mut pen_x = origin_x;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let Some(glyph_id) = self.glyph(ch) else {
                pen_x += fallback;
                continue;
            };
            let advance = self.advance(glyph_id) as f32 * scale;
            if let Some(face) = self.face.as_ref() {
                let mut placed = PlacedOutline {
                    sink: &mut *sink,
                    scale,
                    offset_x: pen_x,
                };
                let _ = face.outline_glyph(GlyphId(glyph_id), &mut placed);
            }
            pen_x += advance;
        }
        Some((pen_x - origin_x).max(0.0))
    }
}

/// Maps font units of one glyph to pixels at its pen position.
struct PlacedOutline<'a> {
    sink: &'a mut dyn OutlineBuilder,
    scale: f32,
    offset_x: f32,
}

impl PlacedOutline<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.offset_x + x * self.scale, -y * self.scale)
    }
}

impl OutlineBuilder for PlacedOutline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.sink.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.sink.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.sink.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.sink.curve_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.sink.close();
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

fn cache_paths(family_key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    family_key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("wcr").join("font-cache");
    let font_path = dir.join(format!("{hash:x}.font"));
    let meta_path = dir.join(format!("{hash:x}.meta"));
    Some((font_path, meta_path))
}

fn load_cached_face(family_key: &str) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(family_key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    let face = Face::parse(&bytes, index).ok()?;
    let units_per_em = face.units_per_em().max(1);
    Some(FontFace::new(bytes, index, units_per_em))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        points: Vec<(f32, f32)>,
        closes: usize,
    }

    impl OutlineBuilder for Recorder {
        fn move_to(&mut self, x: f32, y: f32) {
            self.points.push((x, y));
        }
        fn line_to(&mut self, x: f32, y: f32) {
            self.points.push((x, y));
        }
        fn quad_to(&mut self, _x1: f32, _y1: f32, x: f32, y: f32) {
            self.points.push((x, y));
        }
        fn curve_to(&mut self, _x1: f32, _y1: f32, _x2: f32, _y2: f32, x: f32, y: f32) {
            self.points.push((x, y));
        }
        fn close(&mut self) {
            self.closes += 1;
        }
    }

    #[test]
    fn placed_outline_flips_and_scales() {
        let mut recorder = Recorder::default();
        {
            let mut placed = PlacedOutline {
                sink: &mut recorder,
                scale: 0.5,
                offset_x: 10.0,
            };
            placed.move_to(0.0, 100.0);
            placed.line_to(20.0, -40.0);
            placed.close();
        }
        assert_eq!(recorder.points, vec![(10.0, -50.0), (20.0, 20.0)]);
        assert_eq!(recorder.closes, 1);
    }

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(measure_text_width("", 16.0, "sans-serif"), Some(0.0));
        assert_eq!(measure_text_width("abc", 0.0, "sans-serif"), Some(0.0));
    }

    #[test]
    fn family_key_defaults_to_sans_serif() {
        assert_eq!(normalize_family_key("   "), "sans-serif");
        assert_eq!(normalize_family_key(" Inter "), "Inter");
    }
}
