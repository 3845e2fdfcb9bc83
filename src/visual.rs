#[cfg(target_arch = "wasm32")]
use screeps::*;

use super::constants::*;
use super::location::*;
use super::structure::*;

pub trait RoomVisualizer {
    fn render(&mut self, location: Location, variant: StructureVariant);
}

/// Single-character glyph used by the text overlay.
pub fn glyph(variant: StructureVariant) -> char {
    match variant {
        StructureVariant::Spawn => 'S',
        StructureVariant::Extension => 'e',
        StructureVariant::Storage => 'O',
        StructureVariant::Terminal => 'T',
        StructureVariant::Factory => 'F',
        StructureVariant::Tower => 't',
        StructureVariant::Lab => 'L',
        StructureVariant::Observer => 'V',
        StructureVariant::PowerSpawn => 'P',
        StructureVariant::Nuker => 'N',
        StructureVariant::Extractor => 'X',
        StructureVariant::SourceContainer
        | StructureVariant::ControllerContainer
        | StructureVariant::MineralContainer => 'c',
        StructureVariant::SourceLink | StructureVariant::ControllerLink | StructureVariant::CenterLink => 'k',
        StructureVariant::BaseRoad
        | StructureVariant::SourceRoad
        | StructureVariant::ControllerRoad
        | StructureVariant::MineralRoad
        | StructureVariant::ExitRoad => '+',
        StructureVariant::Rampart => 'R',
        StructureVariant::Wall => '#',
    }
}

/// Renders a layout as a 50x50 character map, one row per line.
///
/// Later renders on a tile overwrite earlier ones, except that roads never
/// hide another structure and ramparts never hide what they cover.
pub struct TextVisualizer {
    rows: Vec<Vec<char>>,
}

impl TextVisualizer {
    pub fn new() -> Self {
        TextVisualizer {
            rows: vec![vec!['.'; ROOM_WIDTH as usize]; ROOM_HEIGHT as usize],
        }
    }

    pub fn get(&self, location: Location) -> char {
        self.rows[location.y() as usize][location.x() as usize]
    }

    pub fn render_to_string(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for TextVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomVisualizer for TextVisualizer {
    fn render(&mut self, location: Location, variant: StructureVariant) {
        let cell = &mut self.rows[location.y() as usize][location.x() as usize];
        let weak = |c: char| c == '.' || c == '+' || c == 'R';
        if *cell == '.' || (weak(*cell) && !(variant.is_road() || variant == StructureVariant::Rampart)) {
            *cell = glyph(variant);
        } else if *cell == '+' && variant == StructureVariant::Rampart {
            *cell = 'R';
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn visual_color(variant: StructureVariant) -> &'static str {
    match variant.kind() {
        StructureType::Road => "#666666",
        StructureType::Rampart => "#3c8a3c",
        StructureType::Wall => "#222222",
        StructureType::Extension => "#f2d36b",
        StructureType::Container | StructureType::Link => "#8fbbd9",
        StructureType::Spawn | StructureType::Storage | StructureType::Terminal => "#ffffff",
        _ => "#d98f8f",
    }
}

// Room visuals are only backed by the game runtime, which is always wasm.
#[cfg(target_arch = "wasm32")]
impl RoomVisualizer for RoomVisual {
    fn render(&mut self, location: Location, variant: StructureVariant) {
        let x = location.x() as f32;
        let y = location.y() as f32;
        let color = visual_color(variant);

        match variant.kind() {
            StructureType::Road => {
                let style = CircleStyle::default().radius(0.15).opacity(0.5).fill(color);
                self.circle(x, y, Some(style));
            }
            StructureType::Rampart | StructureType::Wall => {
                let style = RectStyle::default().opacity(0.3).fill(color);
                self.rect(x - 0.5, y - 0.5, 1.0, 1.0, Some(style));
            }
            _ => {
                let style = CircleStyle::default().radius(0.35).opacity(0.8).fill(color);
                self.circle(x, y, Some(style));
            }
        }
    }
}
