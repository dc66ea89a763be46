//! Caption synthesis.
//!
//! Turns one `<img>` into a free-standing caption fragment:
//!
//! ```text
//! template:  <figure>{img}<figcaption>{title}</figcaption></figure>
//! image:     <img src="dusk.png" title="Dusk & dawn">
//! fragment:  <figure><img src="dusk.png" title="Dusk &amp; dawn"><figcaption>Dusk &amp; dawn</figcaption></figure>
//! ```
//!
//! The title is escaped with maud's renderer before substitution, so markup in a
//! user-authored title shows up as text instead of becoming tags. The image
//! markup is the element's own serialization, inserted verbatim. The fragment's
//! text keeps that escaping when written out, quotes included.
//!
//! The substituted template must parse to exactly one top-level node (blank
//! text aside), since it takes the place of exactly one image.
//!
//! Substitution is a single left-to-right pass: text inserted for one
//! placeholder is never scanned again, so a title that happens to contain the
//! literal `{img}` stays a title.

use crate::dom::{Document, Element, NodeId, NodeKind};
use crate::html::{HtmlEngine, ParseError};
use crate::template::{IMG_TOKEN, TITLE_TOKEN, Template};
use maud::html;

/// Attribute stamped on spliced caption roots so a later run can skip them.
pub const CAPTION_MARKER: &str = "data-image-legend";

/// A parsed, parentless caption subtree, ready for
/// [`splice`](crate::splice::splice).
#[derive(Debug, Clone)]
pub struct CaptionFragment {
    tree: Document,
    root: NodeId,
}

impl CaptionFragment {
    pub fn tree(&self) -> &Document {
        &self.tree
    }

    /// The node that will take the image's place.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn to_html(&self) -> String {
        self.tree.outer_html(self.root)
    }

    /// Stamp the root element with [`CAPTION_MARKER`].
    ///
    /// Returns `false` if the root is not an element (e.g. a text-only
    /// template), in which case nothing can be marked.
    pub fn mark(&mut self) -> bool {
        match self.tree.element_mut(self.root) {
            Some(element) => {
                element.set_attr(CAPTION_MARKER, "");
                true
            }
            None => false,
        }
    }
}

/// The image's caption text, if it has one worth showing.
///
/// Absent, empty, and whitespace-only titles all mean "no caption".
pub fn caption_title(element: &Element) -> Option<&str> {
    element.attr("title").filter(|t| !t.trim().is_empty())
}

/// HTML-escape caption text (`&`, `<`, `>`, `"`).
pub fn escape_title(title: &str) -> String {
    html! { (title) }.into_string()
}

/// Replace every `{title}` and `{img}` in `template` in one pass.
pub fn render(template: &str, title: &str, img: &str) -> String {
    let mut out = String::with_capacity(template.len() + title.len() + img.len());
    let mut rest = template;
    loop {
        let next = [(TITLE_TOKEN, title), (IMG_TOKEN, img)]
            .into_iter()
            .filter_map(|(token, value)| rest.find(token).map(|at| (at, token, value)))
            .min_by_key(|(at, _, _)| *at);
        match next {
            Some((at, token, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + token.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Build the caption fragment for `image`, or `None` if it has no usable title.
///
/// `image` must be an element of `doc`; the document is not modified.
pub fn synthesize(
    engine: &impl HtmlEngine,
    template: &Template,
    doc: &Document,
    image: NodeId,
) -> Result<Option<CaptionFragment>, ParseError> {
    let Some(title) = doc.element(image).and_then(caption_title) else {
        return Ok(None);
    };

    let text = render(
        template.as_str(),
        &escape_title(title),
        &doc.outer_html(image),
    );
    let mut tree = engine.parse_fragment(&text)?;
    let root = fragment_root(&tree, text)?;
    tree.quote_text(root);
    Ok(Some(CaptionFragment { tree, root }))
}

/// The single top-level node that isn't blank text.
fn fragment_root(tree: &Document, text: String) -> Result<NodeId, ParseError> {
    let mut nodes = tree
        .children(tree.root())
        .iter()
        .copied()
        .filter(|&id| match tree.kind(id) {
            NodeKind::Text(t) => !t.trim().is_empty(),
            _ => true,
        });
    match (nodes.next(), nodes.next()) {
        (Some(root), None) => Ok(root),
        (None, _) => Err(ParseError::Empty(text)),
        (Some(_), Some(_)) => Err(ParseError::MultipleRoots(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::Html5Engine;

    const FIGURE: &str = "<figure>{img}<figcaption>{title}</figcaption></figure>";

    /// Parse `markup` as a fragment and return it with its first image.
    fn image_doc(markup: &str) -> (Document, NodeId) {
        let doc = Html5Engine.parse_fragment(markup).unwrap();
        let img = doc
            .descendants(doc.root())
            .find(|&id| doc.element(id).is_some_and(|e| e.is("img")))
            .unwrap();
        (doc, img)
    }

    fn caption(template: &str, markup: &str) -> Option<CaptionFragment> {
        let (doc, img) = image_doc(markup);
        synthesize(&Html5Engine, &Template::new(template), &doc, img).unwrap()
    }

    #[test]
    fn builds_figure_around_image() {
        let fragment = caption(FIGURE, r#"<img src="dusk.png" title="A sunset">"#).unwrap();
        assert_eq!(
            fragment.to_html(),
            r#"<figure><img src="dusk.png" title="A sunset"><figcaption>A sunset</figcaption></figure>"#
        );
    }

    #[test]
    fn no_caption_without_title() {
        assert!(caption(FIGURE, r#"<img src="a.png">"#).is_none());
        assert!(caption(FIGURE, r#"<img src="a.png" title="">"#).is_none());
        assert!(caption(FIGURE, "<img src=\"a.png\" title=\"  \t\n \">").is_none());
    }

    #[test]
    fn title_attribute_name_is_case_insensitive() {
        let (mut doc, img) = image_doc(r#"<img src="a.png">"#);
        doc.element_mut(img).unwrap().set_attr("TITLE", "Upper");
        let fragment = synthesize(&Html5Engine, &Template::new("<p>{title}</p>"), &doc, img)
            .unwrap()
            .unwrap();
        assert_eq!(fragment.to_html(), "<p>Upper</p>");
    }

    #[test]
    fn escapes_markup_in_title() {
        assert_eq!(
            escape_title(r#"<b>"bold" & more</b>"#),
            "&lt;b&gt;&quot;bold&quot; &amp; more&lt;/b&gt;"
        );
    }

    #[test]
    fn title_markup_becomes_text_not_tags() {
        let fragment = caption(FIGURE, r#"<img title="<script>alert(1)</script> & co">"#).unwrap();
        let tree = fragment.tree();
        let has_script = tree
            .descendants(fragment.root())
            .any(|id| tree.element(id).is_some_and(|e| e.is("script")));
        assert!(!has_script);

        let html = fragment.to_html();
        assert!(html.contains("<figcaption>&lt;script&gt;alert(1)&lt;/script&gt; &amp; co</figcaption>"));
    }

    #[test]
    fn substituted_text_carries_quote_entities() {
        let rendered = render(FIGURE, &escape_title(r#"say "cheese""#), "<img>");
        assert!(rendered.contains("say &quot;cheese&quot;"));
        assert!(!rendered.contains(r#""cheese""#));
    }

    #[test]
    fn caption_text_keeps_quote_entities_after_parsing() {
        let fragment = caption(FIGURE, r#"<img title="5&quot; screen">"#).unwrap();
        assert_eq!(
            fragment.to_html(),
            r#"<figure><img title="5&quot; screen"><figcaption>5&quot; screen</figcaption></figure>"#
        );
    }

    #[test]
    fn several_top_level_nodes_are_rejected() {
        let (doc, img) = image_doc(r#"<img title="T">"#);
        let template = Template::new(r#"{img}<p class="cap">{title}</p>"#);
        let err = synthesize(&Html5Engine, &template, &doc, img).unwrap_err();
        assert!(matches!(err, ParseError::MultipleRoots(_)));
    }


    #[test]
    fn render_handles_repeated_and_missing_tokens() {
        assert_eq!(render("{title}|{title}", "t", "i"), "t|t");
        assert_eq!(render("{img}{img}", "t", "i"), "ii");
        assert_eq!(render("<hr>", "t", "i"), "<hr>");
        assert_eq!(render("{img}-{title}-{img}", "t", "i"), "i-t-i");
    }

    #[test]
    fn render_does_not_rescan_inserted_text() {
        assert_eq!(render("{title}/{img}", "{img}", "{title}"), "{img}/{title}");
    }

    #[test]
    fn title_token_inside_attribute_is_escaped() {
        let fragment = caption(
            r#"<div aria-label="{title}">{img}</div>"#,
            r#"<img title="5&quot; screen">"#,
        )
        .unwrap();
        let root = fragment.tree().element(fragment.root()).unwrap();
        assert_eq!(root.attr("aria-label"), Some(r#"5" screen"#));
    }

    #[test]
    fn leading_whitespace_is_not_the_root() {
        let fragment = caption("\n  <figure>{img}</figure>\n", r#"<img title="x">"#).unwrap();
        assert_eq!(fragment.to_html(), r#"<figure><img title="x"></figure>"#);
    }

    #[test]
    fn blank_template_output_is_parse_failure() {
        let (doc, img) = image_doc(r#"<img title="x">"#);
        let err = synthesize(&Html5Engine, &Template::new("   "), &doc, img).unwrap_err();
        assert!(matches!(err, ParseError::Empty(_)));
    }

    #[test]
    fn mark_stamps_root_element() {
        let mut fragment = caption(FIGURE, r#"<img title="x">"#).unwrap();
        assert!(fragment.mark());
        assert!(fragment.to_html().starts_with(r#"<figure data-image-legend="">"#));
    }

    #[test]
    fn text_root_cannot_be_marked() {
        let mut fragment = caption("{title}", r#"<img title="plain">"#).unwrap();
        assert!(!fragment.mark());
        assert_eq!(fragment.to_html(), "plain");
    }

    #[test]
    fn source_document_is_untouched() {
        let (doc, img) = image_doc(r#"<p><img title="x"></p>"#);
        let before = doc.to_html();
        synthesize(&Html5Engine, &Template::new(FIGURE), &doc, img).unwrap();
        assert_eq!(doc.to_html(), before);
    }
}
