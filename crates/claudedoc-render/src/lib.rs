//! ClaudeDoc renderer
//!
//! Pure transformation from a scanned [`Inventory`] to the MDX pages and the
//! sidebar tree of the documentation site. Nothing here touches the
//! filesystem; committing pages is the reconciler's job.

pub mod escape;
pub mod index;
pub mod nav;
pub mod page;
pub mod text;

pub use escape::{escape_mdx, EscapeDepth};
pub use nav::build_navigation;
pub use page::{page_path, PageRenderer, RenderOptions};

use claudedoc_types::{GeneratedPage, Inventory};

impl PageRenderer {
    /// Every page of the site: the root index, then for each populated kind
    /// its index and item pages
    ///
    /// Empty kinds produce no pages, so their output directory is removed on
    /// reconciliation.
    pub fn render_site(&self, inventory: &Inventory) -> Vec<GeneratedPage> {
        let mut pages = vec![self.root_index(inventory)];
        for kind in inventory.populated_kinds() {
            let items = inventory.items(kind);
            pages.push(self.kind_index(kind, items));
            for item in items {
                pages.extend(self.pages(item));
            }
        }
        pages
    }
}
