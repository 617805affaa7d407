//! HTML rendering. Every function here is pure: the same session state always
//! produces the same markup, and each call redraws its whole region with
//! fresh controls.

use pulldown_cmark::{html, Event, Options, Parser};

use crate::conversation::{EntryKind, TranscriptEntry};
use crate::selection::Selection;
use crate::session::PickerSession;
use crate::types::Product;

pub const GRID_PLACEHOLDER: &str = "Select a category to view products";
pub const TRAY_PLACEHOLDER: &str = "No products selected.";

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markdown to HTML for model replies. Raw HTML in the source is shown as text.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Category `<select>`, posting on change.
pub fn render_category_filter(categories: &[String], active: Option<&str>) -> String {
    let mut options = String::from(r#"<option value="" disabled"#);
    if active.is_none() {
        options.push_str(" selected");
    }
    options.push_str(">Choose a category</option>");

    for category in categories {
        let selected = if Some(category.as_str()) == active {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape_html(category),
            selected
        ));
    }

    format!(
        r#"<form class="search-section" method="post" action="/catalog/filter">
  <select id="categoryFilter" name="category" onchange="this.form.submit()">{}</select>
  <noscript><button type="submit">Show</button></noscript>
</form>"#,
        options
    )
}

/// The product grid. Selected cards carry the `selected` class; clicking a
/// card toggles it.
pub fn render_catalog_grid(view: Option<&[Product]>, selection: &Selection) -> String {
    let Some(products) = view else {
        return format!(r#"<div class="placeholder-message">{}</div>"#, GRID_PLACEHOLDER);
    };

    let cards: String = products
        .iter()
        .map(|product| {
            let class = if selection.contains(&product.name) {
                "product-card selected"
            } else {
                "product-card"
            };
            let name = escape_html(&product.name);
            format!(
                r#"
    <form class="{class}" method="post" action="/selection/toggle" data-product-name="{name}">
      <input type="hidden" name="name" value="{name}">
      <button type="submit" class="card-button">
        <img src="{image}" alt="{name}">
        <div class="product-info">
          <h3>{name}</h3>
          <p>{brand}</p>
        </div>
        <div class="product-description-overlay">{description}</div>
      </button>
    </form>"#,
                image = escape_html(&product.image),
                brand = escape_html(&product.brand),
                description = escape_html(&product.description),
            )
        })
        .collect();

    format!(r#"<div class="products-grid">{}</div>"#, cards)
}

/// The selection tray, one item per selected name (placeholders included).
pub fn render_selection_tray(tray: &[Product]) -> String {
    if tray.is_empty() {
        return format!(r#"<div class="placeholder-message">{}</div>"#, TRAY_PLACEHOLDER);
    }

    let items: String = tray
        .iter()
        .map(|product| {
            let name = escape_html(&product.name);
            format!(
                r#"
    <div class="product-card">
      <img src="{image}" alt="{name}">
      <div class="product-info">
        <h3>{name}</h3>
        <p>{brand}</p>
        <form method="post" action="/selection/remove">
          <input type="hidden" name="name" value="{name}">
          <button type="submit" class="remove-selected" data-product-name="{name}">Remove</button>
        </form>
      </div>
    </div>"#,
                image = escape_html(&product.image),
                brand = escape_html(&product.brand),
            )
        })
        .collect();

    format!(r#"<div class="products-grid">{}</div>"#, items)
}

fn render_entry(entry: &TranscriptEntry) -> String {
    let class = match entry.kind {
        EntryKind::User => "chat-message user",
        EntryKind::Error => "chat-message bot error",
        EntryKind::Pending => "chat-message bot pending",
        _ => "chat-message bot",
    };
    let body = if entry.kind.is_reply() {
        render_markdown(&entry.text)
    } else {
        escape_html(&entry.text)
    };
    // Hover shows when the line was added.
    let stamp = entry.at.format("%Y-%m-%d %H:%M UTC");
    match entry.kind.label() {
        Some(label) if entry.kind == EntryKind::User => format!(
            r#"<div class="{class}" title="{stamp}"><strong>{label}</strong> {body}</div>"#
        ),
        Some(label) => format!(
            r#"<div class="{class}" title="{stamp}"><strong>{label}</strong>{body}</div>"#
        ),
        None => format!(r#"<div class="{class}" title="{stamp}">{body}</div>"#),
    }
}

/// The chat window contents.
pub fn render_transcript(entries: &[TranscriptEntry]) -> String {
    entries.iter().map(render_entry).collect::<Vec<_>>().join("\n")
}

/// The full document for the current session state.
pub fn render_page(session: &PickerSession) -> String {
    let categories = session.catalog().categories();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>L'Oréal Routine Builder</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <div class="page-wrapper">
    <header class="site-header">
      <h1 class="site-title">Smart Routine &amp; Product Advisor</h1>
    </header>
    {filter}
    <div id="productsContainer" class="products-container">{grid}</div>
    <section id="selectedProductsContainer" class="selected-products">
      <h2>Selected Products</h2>
      <div id="selectedProductsList">{tray}</div>
      <form method="post" action="/routine">
        <button id="generateRoutine" class="generate-btn" type="submit">Generate Routine</button>
      </form>
      <form method="post" action="/selection/clear">
        <button id="clearSelected" class="clear-btn" type="submit">Clear All</button>
      </form>
    </section>
    <section class="chatbox">
      <h2>Let's Build Your Routine</h2>
      <div id="chatWindow" class="chat-window">{transcript}</div>
      <form id="chatForm" class="chat-form" method="post" action="/chat">
        <input type="text" id="userInput" name="message" placeholder="Ask me about products or routines…" required>
        <button type="submit" id="sendBtn">Send</button>
      </form>
    </section>
  </div>
</body>
</html>
"#,
        filter = render_category_filter(&categories, session.active_category()),
        grid = render_catalog_grid(session.view(), session.selection()),
        tray = render_selection_tray(&session.tray()),
        transcript = render_transcript(session.transcript().entries()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{product, sample_catalog};
    use crate::conversation::Transcript;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_grid_placeholder_before_any_view() {
        let html = render_catalog_grid(None, &Selection::new());
        assert!(html.contains(GRID_PLACEHOLDER));
        assert!(!html.contains("products-grid"));
    }

    #[test]
    fn test_grid_marks_selected_cards() {
        let catalog = sample_catalog();
        let view = catalog.filter_by_category("skincare");
        let selection = Selection::from_names(["Product C"]);

        let html = render_catalog_grid(Some(view.as_slice()), &selection);
        assert_eq!(html.matches("product-card selected").count(), 1);
        assert_eq!(html.matches(r#"class="product-card""#).count(), 1);
        let selected_at = html.find("product-card selected").unwrap();
        assert!(html[selected_at..].contains(r#"data-product-name="Product C""#));
        assert!(!html.contains("Product B"));
    }

    #[test]
    fn test_grid_escapes_product_fields() {
        let mut p = product("Rose <Oil>", "Brand & Co", "skincare");
        p.description = r#""Glow" serum"#.into();
        let products = vec![p];
        let html = render_catalog_grid(Some(products.as_slice()), &Selection::new());
        assert!(html.contains("Rose &lt;Oil&gt;"));
        assert!(html.contains("Brand &amp; Co"));
        assert!(html.contains("&quot;Glow&quot; serum"));
        assert!(!html.contains("<Oil>"));
    }

    #[test]
    fn test_tray_placeholder_and_items() {
        assert!(render_selection_tray(&[]).contains(TRAY_PLACEHOLDER));

        let tray = vec![
            product("Product A", "CeraVe", "skincare"),
            Product::placeholder("Retired Serum"),
        ];
        let html = render_selection_tray(&tray);
        assert_eq!(html.matches("remove-selected").count(), 2);
        assert!(html.contains("<h3>Retired Serum</h3>"));
        assert!(html.contains(r#"<img src="" alt="Retired Serum">"#));
    }

    #[test]
    fn test_transcript_renders_replies_as_markdown() {
        let mut transcript = Transcript::new();
        transcript.push(EntryKind::User, "<script>x</script>");
        transcript.push(EntryKind::Routine, "1. **Cleanse**\n2. Moisturize <em>now</em>");
        transcript.push(EntryKind::Error, "Error connecting to chatbot.");

        let html = render_transcript(transcript.entries());
        assert!(html.contains("<strong>You:</strong> &lt;script&gt;"));
        assert!(html.contains("<strong>Your L'Oréal Routine:</strong><ol>"));
        assert!(html.contains("<strong>Cleanse</strong>"));
        assert!(html.contains("&lt;em&gt;now&lt;/em&gt;"));
        assert!(html.contains(r#"class="chat-message bot error""#));
    }

    #[test]
    fn test_transcript_entry_carries_timestamp() {
        let entry = TranscriptEntry {
            id: uuid::Uuid::new_v4(),
            kind: EntryKind::Notice,
            text: "Please select at least one product.".into(),
            at: chrono::DateTime::parse_from_rfc3339("2026-03-14T09:26:53Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        };
        let html = render_transcript(std::slice::from_ref(&entry));
        assert_eq!(
            html,
            r#"<div class="chat-message bot" title="2026-03-14 09:26 UTC">Please select at least one product.</div>"#
        );
    }

    #[test]
    fn test_category_filter_preselects_active() {
        let categories = vec!["makeup".to_string(), "skincare".to_string()];
        let html = render_category_filter(&categories, Some("skincare"));
        assert!(html.contains(r#"<option value="skincare" selected>skincare</option>"#));
        assert!(html.contains(r#"<option value="makeup">makeup</option>"#));
        assert!(!html.contains("disabled selected"));

        let html = render_category_filter(&categories, None);
        assert!(html.contains("disabled selected"));
    }
}
