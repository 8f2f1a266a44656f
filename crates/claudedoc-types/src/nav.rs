use serde::{Deserialize, Serialize};

/// Sidebar tree node
///
/// Serializes to the shape the site's sidebar loader expects: a bare doc id
/// string for a leaf, an object with `"type": "category"` for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavigationNode {
    Doc(String),
    Category(NavCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryTag {
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkTag {
    Doc,
}

/// Link from a category label to its own index page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    #[serde(rename = "type")]
    pub tag: LinkTag,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavCategory {
    #[serde(rename = "type")]
    pub tag: CategoryTag,
    pub label: String,
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<NavLink>,
    pub items: Vec<NavigationNode>,
}

impl NavigationNode {
    pub fn doc(id: impl Into<String>) -> Self {
        NavigationNode::Doc(id.into())
    }

    pub fn category(
        label: impl Into<String>,
        collapsed: bool,
        link: Option<String>,
        items: Vec<NavigationNode>,
    ) -> Self {
        NavigationNode::Category(NavCategory {
            tag: CategoryTag::Category,
            label: label.into(),
            collapsed,
            link: link.map(|id| NavLink {
                tag: LinkTag::Doc,
                id,
            }),
            items,
        })
    }

    /// Every doc id referenced by this subtree, category links included
    pub fn doc_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            NavigationNode::Doc(id) => out.push(id),
            NavigationNode::Category(category) => {
                if let Some(link) = &category.link {
                    out.push(&link.id);
                }
                for item in &category.items {
                    item.collect_ids(out);
                }
            }
        }
    }
}
