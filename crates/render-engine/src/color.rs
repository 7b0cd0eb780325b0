//! CSS color strings.

use tiny_skia::Color;

/// Parse a CSS color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
/// `rgb(...)`, `rgba(...)`, or a common named color.
pub fn parse_color(input: &str) -> Option<Color> {
    let s = input.trim().to_ascii_lowercase();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    named(&s).and_then(parse_hex)
}

/// Parse a color, substituting `fallback` when it is not understood.
pub fn color_or(input: &str, fallback: Color) -> Color {
    parse_color(input).unwrap_or_else(|| {
        tracing::debug!(color = input, "Unrecognized color; using fallback");
        fallback
    })
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let (r, g, b, a) = match hex.len() {
        3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
        4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };
    Some(Color::from_rgba8(r, g, b, a))
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |p: &str| -> Option<u8> {
        let v = match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? * 2.55,
            None => p.parse::<f32>().ok()?,
        };
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = match parts.get(3) {
        Some(p) => match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => p.parse::<f32>().ok()?,
        },
        None => 1.0,
    };

    Color::from_rgba(
        channel(parts[0])? as f32 / 255.0,
        channel(parts[1])? as f32 / 255.0,
        channel(parts[2])? as f32 / 255.0,
        alpha.clamp(0.0, 1.0),
    )
}

fn named(name: &str) -> Option<&'static str> {
    Some(match name {
        "black" => "000000",
        "white" => "ffffff",
        "red" => "ff0000",
        "green" => "008000",
        "lime" => "00ff00",
        "blue" => "0000ff",
        "navy" => "000080",
        "yellow" => "ffff00",
        "gold" => "ffd700",
        "orange" => "ffa500",
        "purple" => "800080",
        "pink" => "ffc0cb",
        "brown" => "a52a2a",
        "cyan" | "aqua" => "00ffff",
        "magenta" | "fuchsia" => "ff00ff",
        "teal" => "008080",
        "maroon" => "800000",
        "olive" => "808000",
        "silver" => "c0c0c0",
        "gray" | "grey" => "808080",
        "transparent" => "00000000",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(c: Color) -> [u8; 4] {
        let u = c.to_color_u8();
        [u.red(), u.green(), u.blue(), u.alpha()]
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(rgba(parse_color("#f0f0f0").unwrap()), [240, 240, 240, 255]);
        assert_eq!(rgba(parse_color("#333").unwrap()), [51, 51, 51, 255]);
        assert_eq!(rgba(parse_color("#ff000080").unwrap()), [255, 0, 0, 128]);
        assert_eq!(rgba(parse_color("#0f08").unwrap()), [0, 255, 0, 136]);
    }

    #[test]
    fn test_functional_forms() {
        assert_eq!(rgba(parse_color("rgb(139, 105, 20)").unwrap()), [139, 105, 20, 255]);
        assert_eq!(rgba(parse_color("rgba(0,0,0,0.5)").unwrap())[3], 128);
        assert_eq!(rgba(parse_color("rgb(255 0 0 / 50%)").unwrap())[3], 128);
    }

    #[test]
    fn test_named_and_case() {
        assert_eq!(rgba(parse_color("White").unwrap()), [255, 255, 255, 255]);
        assert_eq!(rgba(parse_color("transparent").unwrap())[3], 0);
    }

    #[test]
    fn test_invalid_falls_back() {
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#ggg").is_none());
        assert!(parse_color("rgb(1,2)").is_none());
        assert!(parse_color("chartreuse-ish").is_none());
        assert_eq!(color_or("nope", Color::WHITE), Color::WHITE);
    }
}
