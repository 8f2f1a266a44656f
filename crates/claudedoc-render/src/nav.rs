//! Sidebar tree built from the same inventory the pages came from

use claudedoc_types::{doc_id, Inventory, ItemKind, NavigationNode, SourceItem, INDEX_PAGE};

use crate::page::page_path;

/// Sidebar items: the root index first, then one category per populated kind
///
/// A skill with references becomes a collapsed category linking to the skill
/// page; a skill without references is a plain leaf.
pub fn build_navigation(inventory: &Inventory, prefix: &str) -> Vec<NavigationNode> {
    let mut nodes = vec![NavigationNode::doc(doc_id(prefix, INDEX_PAGE))];

    for kind in inventory.populated_kinds() {
        let items = inventory
            .items(kind)
            .iter()
            .map(|item| item_node(item, prefix))
            .collect();
        nodes.push(NavigationNode::category(
            kind.label(),
            false,
            Some(doc_id(
                prefix,
                &format!("{}/{INDEX_PAGE}", kind.dir_name()),
            )),
            items,
        ));
    }

    nodes
}

fn item_node(item: &SourceItem, prefix: &str) -> NavigationNode {
    let id = doc_id(prefix, &page_path(item));
    let references = item.references();
    if item.kind != ItemKind::Skill || references.is_empty() {
        return NavigationNode::doc(id);
    }

    NavigationNode::category(
        item.title.clone(),
        true,
        Some(id),
        references
            .iter()
            .map(|reference| NavigationNode::doc(doc_id(prefix, &page_path(reference))))
            .collect(),
    )
}
