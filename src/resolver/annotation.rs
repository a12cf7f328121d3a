//! Lookup of the size text that accompanies a download link
//!
//! Article pages print each download's size in a small element next to the
//! link. Where exactly depends on the page layout, so the lookup is a trait
//! and the extraction algorithm does not care which implementation it gets.

use scraper::ElementRef;

/// Finds the size annotation belonging to a download link
pub trait SizeAnnotationLookup: Send + Sync {
    /// Returns the raw size text near `link`, if any
    fn size_text(&self, link: &ElementRef<'_>) -> Option<String>;
}

/// Looks for a `<span>` with a given class near the link
///
/// The link's following siblings are searched first, up to the next link.
/// When nothing is found there, the parent is searched, but only if the link
/// is the parent's sole link. A span is never shared between two links.
#[derive(Debug, Clone)]
pub struct SiblingSpanLookup {
    class: String,
}

impl SiblingSpanLookup {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    fn is_link(element: &ElementRef<'_>) -> bool {
        element.value().name() == "a"
    }

    fn is_size_span(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        value.name() == "span" && value.classes().any(|c| c == self.class.as_str())
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl SizeAnnotationLookup for SiblingSpanLookup {
    fn size_text(&self, link: &ElementRef<'_>) -> Option<String> {
        for sibling in link.next_siblings().filter_map(ElementRef::wrap) {
            // Anything past the next link belongs to that link
            if Self::is_link(&sibling) {
                return None;
            }
            if self.is_size_span(&sibling) {
                return Some(element_text(&sibling));
            }
        }

        let parent = link.parent().and_then(ElementRef::wrap)?;
        let elements = || parent.descendants().filter_map(ElementRef::wrap);
        if elements().filter(Self::is_link).count() > 1 {
            return None;
        }
        elements()
            .find(|el| self.is_size_span(el))
            .map(|el| element_text(&el))
    }
}
