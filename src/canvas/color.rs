//! 256-color palette

use std::fmt;

/// Escape sequence restoring the default terminal attributes.
pub const RESET: &str = "\x1b[0m";

/// A line or label color: an index into the 256-color palette, or the
/// terminal's own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
}

/// X11 color names mapped onto their closest 256-color palette index.
const NAMED: &[(&str, u8)] = &[
    ("aliceblue", 255), ("antiquewhite", 255), ("aqua", 14), ("aquamarine", 122),
    ("azure", 15), ("beige", 230), ("bisque", 224), ("black", 0), ("blanchedalmond", 230),
    ("blue", 12), ("blueviolet", 92), ("brown", 88), ("burlywood", 180), ("cadetblue", 73),
    ("chartreuse", 118), ("chocolate", 166), ("coral", 209), ("cornflowerblue", 68),
    ("cornsilk", 230), ("crimson", 161), ("cyan", 14), ("darkblue", 18), ("darkcyan", 30),
    ("darkgoldenrod", 136), ("darkgray", 248), ("darkgreen", 22), ("darkkhaki", 143),
    ("darkmagenta", 90), ("darkolivegreen", 59), ("darkorange", 208), ("darkorchid", 134),
    ("darkred", 88), ("darksalmon", 173), ("darkseagreen", 108), ("darkslateblue", 60),
    ("darkslategray", 238), ("darkturquoise", 44), ("darkviolet", 92), ("deeppink", 198),
    ("deepskyblue", 39), ("dimgray", 242), ("dodgerblue", 33), ("firebrick", 124),
    ("floralwhite", 15), ("forestgreen", 28), ("fuchsia", 13), ("gainsboro", 253),
    ("ghostwhite", 15), ("gold", 220), ("goldenrod", 178), ("gray", 8), ("green", 2),
    ("greenyellow", 155), ("honeydew", 15), ("hotpink", 205), ("indianred", 167),
    ("indigo", 54), ("ivory", 15), ("khaki", 222), ("lavender", 254),
    ("lavenderblush", 255), ("lawngreen", 118), ("lemonchiffon", 230), ("lightblue", 152),
    ("lightcoral", 210), ("lightcyan", 195), ("lightgoldenrodyellow", 230),
    ("lightgray", 252), ("lightgreen", 120), ("lightpink", 217), ("lightsalmon", 216),
    ("lightseagreen", 37), ("lightskyblue", 117), ("lightslategray", 103),
    ("lightsteelblue", 152), ("lightyellow", 230), ("lime", 10), ("limegreen", 77),
    ("linen", 255), ("magenta", 13), ("maroon", 1), ("mediumaquamarine", 79),
    ("mediumblue", 20), ("mediumorchid", 134), ("mediumpurple", 98),
    ("mediumseagreen", 72), ("mediumslateblue", 99), ("mediumspringgreen", 48),
    ("mediumturquoise", 80), ("mediumvioletred", 162), ("midnightblue", 17),
    ("mintcream", 15), ("mistyrose", 224), ("moccasin", 223), ("navajowhite", 223),
    ("navy", 4), ("oldlace", 230), ("olive", 3), ("olivedrab", 64), ("orange", 214),
    ("orangered", 202), ("orchid", 170), ("palegoldenrod", 223), ("palegreen", 120),
    ("paleturquoise", 159), ("palevioletred", 168), ("papayawhip", 230),
    ("peachpuff", 223), ("peru", 173), ("pink", 218), ("plum", 182), ("powderblue", 152),
    ("purple", 5), ("red", 9), ("rosybrown", 138), ("royalblue", 63), ("saddlebrown", 94),
    ("salmon", 210), ("sandybrown", 215), ("seagreen", 29), ("seashell", 15),
    ("sienna", 131), ("silver", 7), ("skyblue", 117), ("slateblue", 62), ("slategray", 66),
    ("snow", 15), ("springgreen", 48), ("steelblue", 67), ("tan", 180), ("teal", 6),
    ("thistle", 182), ("tomato", 203), ("turquoise", 80), ("violet", 213), ("wheat", 223),
    ("white", 15), ("whitesmoke", 255), ("yellow", 11), ("yellowgreen", 149),
];

impl Color {
    /// Look up a palette color by name. Case, spaces, dashes and underscores
    /// are ignored, so `"Dim Gray"`, `"dim-gray"` and `"dimgray"` all match.
    /// `"default"` yields [`Color::Default`].
    pub fn named(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if key == "default" {
            return Some(Color::Default);
        }
        if let Ok(index) = key.parse::<u8>() {
            return Some(Color::Indexed(index));
        }
        NAMED
            .iter()
            .find(|(n, _)| *n == key)
            .map(|&(_, index)| Color::Indexed(index))
    }

    /// All known color names
    pub fn names() -> impl Iterator<Item = &'static str> {
        NAMED.iter().map(|(n, _)| *n)
    }
}

/// Writes the foreground escape sequence; `Default` writes a reset.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Default => f.write_str(RESET),
            Color::Indexed(index) => write!(f, "\x1b[38;5;{}m", index),
        }
    }
}

impl From<Color> for ratatui::style::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::Default => ratatui::style::Color::Reset,
            Color::Indexed(index) => ratatui::style::Color::Indexed(index),
        }
    }
}
