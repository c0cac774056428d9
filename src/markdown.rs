// SPDX-FileCopyrightText: 2025 bridge-core
// SPDX-License-Identifier: MIT

//! Markdown to HTML conversion for release bodies and plugin READMEs.
//!
//! Conversion is infallible: malformed markdown degrades to whatever HTML
//! the parser produces, never to an error. Tables and strikethrough are
//! enabled to match the flavor used in the upstream repositories.

use pulldown_cmark::{Options, Parser, html};

/// Converts a markdown document into an HTML fragment.
///
/// An empty input yields an empty fragment.
///
/// # Examples
///
/// ```
/// use bridge_site_data::render_html;
///
/// let fragment = render_html("# Title");
/// assert_eq!(fragment, "<h1>Title</h1>\n");
/// ```
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut fragment = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut fragment, parser);
    fragment
}
