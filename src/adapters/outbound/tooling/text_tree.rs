use crate::scan_engine::domain::{ComponentId, GeneralInfo, ResolvedModule};

/// Attaches depth-annotated entries, listed in pre-order, to `module`.
///
/// Depth 1 entries are direct dependencies. `None` entries are placeholders
/// for lines that could not be converted; everything listed below them is
/// dropped with them.
pub fn attach_indented(
    module: &mut ResolvedModule,
    entries: impl IntoIterator<Item = (usize, Option<GeneralInfo>)>,
) {
    let root = module.id().clone();
    let mut stack: Vec<Option<ComponentId>> = Vec::new();

    for (depth, info) in entries {
        if depth == 0 || depth > stack.len() + 1 {
            continue;
        }
        stack.truncate(depth - 1);

        let parent = if depth == 1 {
            Some(root.clone())
        } else {
            stack.last().cloned().flatten()
        };
        let id = match (parent, info) {
            (Some(parent), Some(info)) => {
                let id = info.id().clone();
                module.add_edge(&parent, info);
                Some(id)
            }
            _ => None,
        };
        stack.push(id);
    }
}
