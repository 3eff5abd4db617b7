//! Chip and popup styling.

use ratatui::style::{Color, Modifier, Style};

/// Parse a configured color: `#rgb`, `#rrggbb`, `rgb(r,g,b)` or a name.
pub fn parse_color(s: &str) -> Option<Color> {
    let lower = s.trim().to_ascii_lowercase();
    if let Some(c) = parse_hex_color(&lower) {
        return Some(c);
    }
    if let Some(c) = parse_rgb_func(&lower) {
        return Some(c);
    }
    match lower.as_str() {
        "black" => Some(Color::Black),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "dark-grey" | "darkgray" => Some(Color::DarkGray),
        "red" => Some(Color::Red),
        "light_red" | "light-red" => Some(Color::LightRed),
        "green" => Some(Color::Green),
        "light_green" | "light-green" => Some(Color::LightGreen),
        "blue" => Some(Color::Blue),
        "light_blue" | "light-blue" => Some(Color::LightBlue),
        "cyan" => Some(Color::Cyan),
        "light_cyan" | "light-cyan" => Some(Color::LightCyan),
        "magenta" | "purple" => Some(Color::Magenta),
        "light_magenta" | "light-magenta" => Some(Color::LightMagenta),
        "yellow" => Some(Color::Yellow),
        "light_yellow" | "light-yellow" => Some(Color::LightYellow),
        _ => None,
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

fn parse_rgb_func(s: &str) -> Option<Color> {
    let content = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<_> = content
        .split([',', ' '])
        .filter(|t| !t.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }
    let r = parts[0].parse::<u16>().ok()?;
    let g = parts[1].parse::<u16>().ok()?;
    let b = parts[2].parse::<u16>().ok()?;
    Some(Color::Rgb(
        r.min(255) as u8,
        g.min(255) as u8,
        b.min(255) as u8,
    ))
}

/// Style for a chip drawn with its configured color; unknown colors fall
/// back to the terminal default.
pub fn chip_style(color: &str) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match parse_color(color) {
        Some(color) => style.fg(color),
        None => style,
    }
}

pub fn active_candidate_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn error_style() -> Style {
    Style::default().fg(Color::Red)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_hex_and_rgb() {
        assert_eq!(parse_color("Cyan"), Some(Color::Cyan));
        assert_eq!(parse_color("purple"), Some(Color::Magenta));
        assert_eq!(parse_color("#0f8"), Some(Color::Rgb(0x00, 0xff, 0x88)));
        assert_eq!(parse_color("#336699"), Some(Color::Rgb(0x33, 0x66, 0x99)));
        assert_eq!(parse_color("rgb(300, 10, 0)"), Some(Color::Rgb(255, 10, 0)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn unknown_chip_color_keeps_bold_only() {
        let style = chip_style("not-a-color");
        assert_eq!(style.fg, None);
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(chip_style("green").fg, Some(Color::Green));
    }
}
