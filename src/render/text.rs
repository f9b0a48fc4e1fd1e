use crate::config::ViewOptions;
use crate::view::{Layout, ProcessTreeView, VisibleNode};

const INDENT: &str = "  ";

/// Cuts `command_line` to `width` characters, marking the cut with "...".
pub fn truncate_command_line(command_line: &str, width: usize) -> String {
    match command_line.char_indices().nth(width) {
        Some((cut, _)) => format!("{}...", &command_line[..cut]),
        None => command_line.to_string(),
    }
}

pub fn toggle_glyph(row: &VisibleNode<'_>) -> char {
    match (row.has_children, row.expanded) {
        (false, _) => ' ',
        (true, true) => '-',
        (true, false) => '+',
    }
}

/// One plain-text line for a visible node.
pub fn row_line(row: &VisibleNode<'_>, options: &ViewOptions, layout: Layout) -> String {
    let process = &row.node.process;
    let marker = if row.selected { '>' } else { ' ' };
    let mut line = format!(
        "{}{}{} {} [{}]",
        marker,
        INDENT.repeat(row.depth.min(options.max_depth)),
        toggle_glyph(row),
        process.name,
        row.node.id
    );
    // Indentation stops at max_depth; deeper rows say how deep they are.
    if row.depth > options.max_depth {
        line.push_str(&format!(" (depth {})", row.depth));
    }
    if row.highlighted {
        line.push_str(" *");
    }
    if options.show_command_line && !process.command_line.is_empty() {
        line.push_str("  ");
        line.push_str(&truncate_command_line(
            &process.command_line,
            options.label_width(layout),
        ));
    }
    line
}

pub fn render_lines(view: &ProcessTreeView) -> Vec<String> {
    let layout = view.state().layout;
    view.visible_nodes()
        .map(|row| row_line(&row, view.options(), layout))
        .collect()
}
