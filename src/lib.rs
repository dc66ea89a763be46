//! # image-legend
//!
//! A post-build transform for generated HTML documentation: every `<img>` with
//! a `title` is replaced by a caption block built from a template, so the title
//! becomes visible text under the image.
//!
//! ```text
//! <p><img src="dusk.png" title="A sunset"></p>
//!                     ↓
//! <p><figure class="image-legend" data-image-legend="">
//!   <img src="dusk.png" title="A sunset">
//!   <figcaption>A sunset</figcaption>
//! </figure></p>
//! ```
//!
//! # Architecture: Three Pure Steps and a Driver
//!
//! ```text
//! 1. Select      document  →  [img]        which images are candidates
//! 2. Synthesize  img       →  fragment     template + escaped title + img markup
//! 3. Splice      fragment  →  document     fragment takes the img's slot
//! ```
//!
//! The [`driver`] runs the three steps over each file of a run and writes the
//! result back in place. The steps themselves never touch the filesystem, so
//! they are tested on in-memory documents.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`select`] | Candidate images in document order; `id="logo"` opt-out |
//! | [`caption`] | Caption fragment synthesis: eligibility, escaping, substitution |
//! | [`splice`] | In-place subtree replacement |
//! | [`template`] | Loads the caption template (bundled or from a file) |
//! | [`driver`] | Per-file read → caption → atomic write, parallel over files |
//! | [`dom`] | The mutable document tree the steps operate on |
//! | [`html`] | Parser/serializer boundary ([`html::HtmlEngine`]), html5ever via `scraper` |
//! | [`manifest`] | Which files to process: build manifest or directory walk |
//! | [`config`] | `image-legend.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## An Own Tree, Not the Parser's
//!
//! The steps work on [`dom::Document`] rather than on a parser library's node
//! type. Parsing happens once per file (and once per caption fragment) behind
//! [`html::HtmlEngine`]; everything after that is plain index manipulation.
//! Swapping the parser means writing one conversion function.
//!
//! ## Tolerant Parsing
//!
//! Generated pages are not always valid HTML, and templates are user-authored.
//! html5ever repairs malformed markup the way browsers do instead of rejecting
//! it, so captioning never aborts on a stray unclosed tag. The price is that a
//! rewritten file is normalized by the round trip (implied `<head>`/`<body>`,
//! quoted attributes). Files without captions are therefore left byte-for-byte
//! alone.
//!
//! ## Safe Re-runs
//!
//! Each spliced caption carries a `data-image-legend` attribute, and images
//! inside such a caption are never selected again. Running the tool twice over
//! the same output gives the same result as running it once. Setting
//! `mark_captions = false` restores the unmarked behaviour, where a second run
//! wraps each caption in another one.

pub mod caption;
pub mod config;
pub mod dom;
pub mod driver;
pub mod html;
pub mod manifest;
pub mod output;
pub mod select;
pub mod splice;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
