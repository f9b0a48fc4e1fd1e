use crate::config::ViewOptions;
use crate::view::Layout;
use std::fmt;

const HORIZONTAL_ROW_HEIGHT: u32 = 30;
const VERTICAL_ROW_HEIGHT: u32 = 15;

/// Canvas height for `visible` rows, clamped to the configured bounds.
pub fn canvas_height(visible: usize, options: &ViewOptions, layout: Layout) -> u32 {
    let per_row = match layout {
        Layout::Horizontal => HORIZONTAL_ROW_HEIGHT,
        Layout::Vertical => VERTICAL_ROW_HEIGHT,
    };
    let rows = u32::try_from(visible).unwrap_or(u32::MAX);
    rows.saturating_mul(per_row)
        .clamp(options.min_height, options.max_height.max(options.min_height))
}

/// Sizes a graphical renderer needs to lay out the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasGeometry {
    pub height: u32,
    pub node_size: u32,
    /// Distance between a node and its parent.
    pub level_spacing: u32,
    pub sibling_spacing: u32,
}

pub fn canvas_geometry(visible: usize, options: &ViewOptions, layout: Layout) -> CanvasGeometry {
    let (level_spacing, sibling_spacing) = match layout {
        Layout::Horizontal => (options.horizontal_spacing, options.vertical_spacing),
        Layout::Vertical => (options.vertical_spacing, options.horizontal_spacing),
    };
    CanvasGeometry {
        height: canvas_height(visible, options, layout),
        node_size: options.node_size,
        level_spacing,
        sibling_spacing,
    }
}

impl fmt::Display for CanvasGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "canvas {}px, nodes {}px, spacing {}x{}",
            self.height, self.node_size, self.level_spacing, self.sibling_spacing
        )
    }
}
