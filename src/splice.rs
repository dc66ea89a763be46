//! Replacing an image with its caption fragment.

use crate::caption::CaptionFragment;
use crate::dom::{Document, NodeId};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpliceError {
    #[error("image node {0:?} is not attached to a parent")]
    Detached(NodeId),
}

/// Put `fragment` where `image` is, and detach `image`.
///
/// The fragment is copied into `doc`; the id of the copy's root is returned.
/// The image's parent keeps the same number of children in the same order.
/// Calling this twice for the same image fails: after the first call the image
/// no longer has a parent.
pub fn splice(
    doc: &mut Document,
    image: NodeId,
    fragment: &CaptionFragment,
) -> Result<NodeId, SpliceError> {
    if doc.parent(image).is_none() {
        return Err(SpliceError::Detached(image));
    }
    let root = doc.import(fragment.tree(), fragment.root());
    if doc.replace(image, root) {
        Ok(root)
    } else {
        Err(SpliceError::Detached(image))
    }
}
