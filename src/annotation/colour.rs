use image::Rgb;
use regex::Regex;

/// Parses `#rgb`, `#rrggbb` or a common colour name.
pub fn parse_colour(value: &str) -> Option<Rgb<u8>> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    let rgb = match value.to_ascii_lowercase().as_str() {
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "magenta" | "fuchsia" => [255, 0, 255],
        "cyan" | "aqua" => [0, 255, 255],
        "pink" => [255, 192, 203],
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    };
    Some(Rgb(rgb))
}

fn parse_hex(hex: &str) -> Option<Rgb<u8>> {
    let re = Regex::new(r"^(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").ok()?;
    if !re.is_match(hex) {
        return None;
    }
    let digits: Vec<u8> = hex
        .chars()
        .filter_map(|c| c.to_digit(16).map(|d| d as u8))
        .collect();
    let rgb = if digits.len() == 3 {
        [digits[0] * 17, digits[1] * 17, digits[2] * 17]
    } else {
        [
            digits[0] * 16 + digits[1],
            digits[2] * 16 + digits[3],
            digits[4] * 16 + digits[5],
        ]
    };
    Some(Rgb(rgb))
}
