//! Image selection.
//!
//! Every `<img>` in the document is a candidate, in document order, except:
//!
//! - images whose `id` is `logo` (any case), the branding escape hatch
//! - images already sitting inside a caption spliced in by an earlier run,
//!   recognised by the [`CAPTION_MARKER`] attribute on the image itself or an
//!   ancestor
//!
//! Selection only reads the tree. Whether an image actually gets a caption is
//! decided later, by [`synthesize`](crate::caption::synthesize), from its title.

use crate::caption::CAPTION_MARKER;
use crate::dom::{Document, Element, NodeId};

/// Images with this `id` never get a caption.
pub const RESERVED_ID: &str = "logo";

/// Collect the ids of all caption candidates, in document order.
pub fn select(doc: &Document) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .filter(|&id| {
            doc.element(id)
                .is_some_and(|e| e.is("img") && !is_reserved(e))
        })
        .filter(|&id| !inside_caption(doc, id))
        .collect()
}

/// True for `<img id="logo">` regardless of case.
pub fn is_reserved(element: &Element) -> bool {
    element
        .attr("id")
        .is_some_and(|id| id.eq_ignore_ascii_case(RESERVED_ID))
}

fn inside_caption(doc: &Document, id: NodeId) -> bool {
    std::iter::once(id)
        .chain(doc.ancestors(id))
        .filter_map(|a| doc.element(a))
        .any(|e| e.attr(CAPTION_MARKER).is_some())
}
