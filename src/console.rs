use crate::classify::Tier;
use crate::token::{BarToken, Span};
use crossterm::style::{Color, Stylize};

const BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders decoded spans as a single terminal line.
///
/// Text keeps its colour; bar tokens become block glyphs so the sparkline and
/// the CPU/memory bars stay visible without the status bar's pixel channel.
pub fn render_preview(spans: &[Span], color: bool) -> String {
    let mut line = String::new();
    for span in spans {
        let (tier, piece) = match span {
            Span::Text { color, text } => (*color, text.clone()),
            Span::Bar(bar) => (bar.color, bar_glyphs(bar)),
        };
        match terminal_color(tier) {
            Some(c) if color => line.push_str(&piece.with(c).to_string()),
            _ => line.push_str(&piece),
        }
    }
    line
}

fn bar_glyphs(bar: &BarToken) -> String {
    if !bar.filled {
        return "|".to_string();
    }
    if bar.width <= 1 {
        return BLOCKS[usize::from(bar.height).min(BLOCKS.len() - 1)].to_string();
    }
    // One cell per ten pixels, at least one for a non-empty bar.
    let cells = usize::from(bar.width).div_ceil(10);
    "■".repeat(cells)
}

fn terminal_color(tier: Tier) -> Option<Color> {
    match tier {
        Tier::Normal => None,
        Tier::Selected => Some(Color::White),
        Tier::Red => Some(Color::Red),
        Tier::Orange => Some(Color::DarkYellow),
        Tier::Yellow => Some(Color::Yellow),
        Tier::Blue => Some(Color::Blue),
        Tier::Cyan => Some(Color::Cyan),
        Tier::Green => Some(Color::Green),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_preview_keeps_text_and_draws_bars() {
        let spans = vec![
            Span::Text {
                color: Tier::Red,
                text: "81.0C".into(),
            },
            Span::Text {
                color: Tier::Normal,
                text: "::".into(),
            },
            Span::Bar(BarToken::filled(0, 2, 1, 6, 0, Tier::Green)),
            Span::Bar(BarToken::filled(0, 9, 1, 0, 1, Tier::Red)),
            Span::Bar(BarToken::filled(0, 1, 25, 12, 0, Tier::Green)),
            Span::Bar(BarToken::outline(0, 1, 100, 12, 101, Tier::Normal)),
        ];
        assert_eq!(render_preview(&spans, false), "81.0C::▆ ■■■|");
    }

    #[test]
    fn coloured_preview_wraps_non_default_tiers() {
        let spans = vec![Span::Text {
            color: Tier::Red,
            text: "hot".into(),
        }];
        let line = render_preview(&spans, true);
        assert!(line.contains("hot"));
        assert!(line.starts_with('\u{1b}'));
    }
}
