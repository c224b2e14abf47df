// 🏷️ Entry Classifier - Standard vs Consolidated order layout
// Decided once per entry; every extractor receives the variant explicitly

use crate::browser::{locate, Browser};
use crate::error::{BrowserError, ScrapeError};
use crate::order::EntryVariant;
use crate::selectors::SelectorMap;
use tracing::debug;

/// Result of classification: the variant plus the container the amount and
/// date live under (header or info, whichever was found)
pub struct ClassifiedEntry<'a, B: Browser + 'a> {
    pub variant: EntryVariant,
    pub container: B::Element<'a>,
}

/// Probe the header marker first, fall back to the info marker.
/// The consolidated marker class on the chosen container decides the variant.
pub fn classify_entry<'a, B: Browser>(
    browser: &'a B,
    entry: &B::Element<'a>,
    selectors: &SelectorMap,
) -> Result<ClassifiedEntry<'a, B>, ScrapeError> {
    let container = match locate(browser, Some(entry), &selectors.header) {
        Ok(header) => header,
        Err(BrowserError::NotFound { .. }) => locate(browser, Some(entry), &selectors.info)
            .map_err(|err| match err {
                BrowserError::NotFound { .. } => ScrapeError::Classification(format!(
                    "neither `{}` nor `{}` present",
                    selectors.header, selectors.info
                )),
                other => ScrapeError::Browser(other),
            })?,
        Err(other) => return Err(ScrapeError::Browser(other)),
    };

    let class_attr = browser.attribute(&container, "class")?.unwrap_or_default();
    let variant = variant_from_classes(&class_attr, &selectors.consolidated_marker);
    debug!(variant = variant.name(), classes = %class_attr, "classified entry");

    Ok(ClassifiedEntry { variant, container })
}

/// Whole-word match of the marker in a class attribute
pub fn variant_from_classes(class_attr: &str, marker: &str) -> EntryVariant {
    if class_attr.split_whitespace().any(|class| class == marker) {
        EntryVariant::Consolidated
    } else {
        EntryVariant::Standard
    }
}
