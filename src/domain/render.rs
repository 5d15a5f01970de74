/*
Workaround for error: https://doc.rust-lang.org/error_codes/E0116.html
Cannot define inherent `impl` for a type outside of the crate where the type is defined

termtree::Tree belongs to another crate, so the conversion lives in a trait.
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::directory::StudentDirectory;

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeRender for StudentDirectory {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(directory: &StudentDirectory, node_idx: Index, side: &str) -> Tree<String> {
            let Some(node) = directory.get_node(node_idx) else {
                return Tree::new(side.to_string());
            };
            let mut tree = Tree::new(format!("{}{}", side, node.record.render().trim_end()));
            for (child_side, child) in [("L ", node.left), ("R ", node.right)] {
                if let Some(child_idx) = child {
                    tree.push(build_tree(directory, child_idx, child_side));
                }
            }
            tree
        }

        match self.root() {
            Some(root_idx) => build_tree(self, root_idx, ""),
            None => Tree::new("(empty)".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::StudentRecord;

    #[test]
    fn given_empty_directory_when_rendering_then_placeholder() {
        let tree = StudentDirectory::new().to_tree_string();
        assert_eq!(tree.to_string().trim_end(), "(empty)");
    }

    // M
    // ├── L D
    // └── R S
    #[test]
    fn given_directory_when_rendering_then_children_marked_by_side() {
        let directory: StudentDirectory = ["M", "D", "S"]
            .into_iter()
            .map(|s| StudentRecord::new(s, "AA", [5].into_iter().collect()))
            .collect();

        let rendered = directory.to_tree_string().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "M AA: 5");
        assert!(lines[1].ends_with("L D AA: 5"));
        assert!(lines[2].ends_with("R S AA: 5"));
    }
}
