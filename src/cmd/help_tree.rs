//! cmd::help_tree
//!
//! `--help-tree` rendering: one line per visible command, indented by depth,
//! with short descriptions aligned in a single column.

use super::compile::Node;
use crate::app::output::rpad;

const INDENT: usize = 2;

/// Render the tree rooted at `root`.
///
/// Hidden commands are omitted along with their descendants. Children are
/// listed in name order.
pub(crate) fn render(root: &Node<'_>) -> String {
    let width = max_width(root, 0);
    let mut out = String::new();
    render_node(&mut out, root, 0, width);
    out
}

fn render_node(out: &mut String, node: &Node<'_>, depth: usize, width: usize) {
    if node.hidden {
        return;
    }
    let indent = depth * INDENT;
    out.push_str(&" ".repeat(indent));
    out.push_str(&rpad(&node.name, width - indent));
    out.push_str("  ");
    out.push_str(&node.short);
    out.push('\n');
    for child in sorted_children(node) {
        render_node(out, child, depth + 1, width);
    }
}

fn max_width(node: &Node<'_>, depth: usize) -> usize {
    if node.hidden {
        return 0;
    }
    let own = depth * INDENT + node.name.chars().count();
    sorted_children(node)
        .into_iter()
        .map(|child| max_width(child, depth + 1))
        .fold(own, usize::max)
}

fn sorted_children<'n, 'a>(node: &'n Node<'a>) -> Vec<&'n Node<'a>> {
    let mut children: Vec<_> = node.children.iter().collect();
    children.sort_by(|a, b| a.name.cmp(&b.name));
    children
}
