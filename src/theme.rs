use serde::{Deserialize, Serialize};

/// Named accent colors a node can carry. Unknown keys collapse to `Default`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ThemeColor {
    Red,
    Pink,
    Purple,
    DeepPurple,
    Indigo,
    Blue,
    LightBlue,
    Cyan,
    Teal,
    Green,
    LightGreen,
    Lime,
    Yellow,
    Amber,
    Orange,
    DeepOrange,
    Brown,
    Grey,
    BlueGrey,
    #[default]
    Default,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 20] = [
        ThemeColor::Red,
        ThemeColor::Pink,
        ThemeColor::Purple,
        ThemeColor::DeepPurple,
        ThemeColor::Indigo,
        ThemeColor::Blue,
        ThemeColor::LightBlue,
        ThemeColor::Cyan,
        ThemeColor::Teal,
        ThemeColor::Green,
        ThemeColor::LightGreen,
        ThemeColor::Lime,
        ThemeColor::Yellow,
        ThemeColor::Amber,
        ThemeColor::Orange,
        ThemeColor::DeepOrange,
        ThemeColor::Brown,
        ThemeColor::Grey,
        ThemeColor::BlueGrey,
        ThemeColor::Default,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ThemeColor::Red => "red",
            ThemeColor::Pink => "pink",
            ThemeColor::Purple => "purple",
            ThemeColor::DeepPurple => "deepPurple",
            ThemeColor::Indigo => "indigo",
            ThemeColor::Blue => "blue",
            ThemeColor::LightBlue => "lightBlue",
            ThemeColor::Cyan => "cyan",
            ThemeColor::Teal => "teal",
            ThemeColor::Green => "green",
            ThemeColor::LightGreen => "lightGreen",
            ThemeColor::Lime => "lime",
            ThemeColor::Yellow => "yellow",
            ThemeColor::Amber => "amber",
            ThemeColor::Orange => "orange",
            ThemeColor::DeepOrange => "deepOrange",
            ThemeColor::Brown => "brown",
            ThemeColor::Grey => "grey",
            ThemeColor::BlueGrey => "blueGrey",
            ThemeColor::Default => "default",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn hex(self) -> &'static str {
        match self {
            ThemeColor::Red => "#f44336",
            ThemeColor::Pink => "#e91e63",
            ThemeColor::Purple => "#9c27b0",
            ThemeColor::DeepPurple => "#673ab7",
            ThemeColor::Indigo => "#3f51b5",
            ThemeColor::Blue => "#2196f3",
            ThemeColor::LightBlue => "#03a9f4",
            ThemeColor::Cyan => "#00bcd4",
            ThemeColor::Teal => "#009688",
            ThemeColor::Green => "#4caf50",
            ThemeColor::LightGreen => "#8bc34a",
            ThemeColor::Lime => "#cddc39",
            ThemeColor::Yellow => "#ffeb3b",
            ThemeColor::Amber => "#ffc107",
            ThemeColor::Orange => "#ff9800",
            ThemeColor::DeepOrange => "#ff5722",
            ThemeColor::Brown => "#795548",
            ThemeColor::Grey => "#9e9e9e",
            ThemeColor::BlueGrey => "#607d8b",
            ThemeColor::Default => "#1976d2",
        }
    }

    pub fn rgb(self) -> Rgb {
        Rgb::from_hex(self.hex()).unwrap_or(Rgb::DEFAULT_ACCENT)
    }
}

impl From<String> for ThemeColor {
    fn from(key: String) -> Self {
        ThemeColor::from_key(&key).unwrap_or_default()
    }
}

impl From<ThemeColor> for String {
    fn from(color: ThemeColor) -> Self {
        color.key().to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const DEFAULT_ACCENT: Rgb = Rgb {
        r: 0x19,
        g: 0x76,
        b: 0xd2,
    };

    /// Parses `#rrggbb` (leading `#` optional). Shorter strings are rejected.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() < 6 || !hex.is_char_boundary(6) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

/// Stroke paint for an edge: either the explicit override or a two-stop
/// gradient running from the source node's accent to the target's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgePaint {
    Solid(Rgb),
    Gradient { from: Rgb, to: Rgb },
}

pub fn edge_paint(override_color: Option<&str>, source: ThemeColor, target: ThemeColor) -> EdgePaint {
    if let Some(color) = override_color.and_then(Rgb::from_hex) {
        return EdgePaint::Solid(color);
    }
    let from = source.rgb();
    let to = target.rgb();
    if from == to {
        EdgePaint::Solid(from)
    } else {
        EdgePaint::Gradient { from, to }
    }
}
