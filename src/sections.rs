//! Heading-driven section segmentation.
//!
//! Each catalog entry contributes at most one heading: its pattern's first
//! match in the text. A section's content runs from the end of its heading
//! to the nearest start of another section's heading that lies after its
//! own start, or to the end of the text. When two headings start at the
//! same offset, the section listed earlier in the catalog owns the content
//! and the later one ends up empty.
//!
//! The rule is order-sensitive on purpose: risk feature columns are defined
//! per catalog section, so segmentation must stay exactly this simple.

use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

use crate::config::SectionConfig;

/// Compiled section catalog.
#[derive(Debug, Clone)]
pub struct SectionCatalog {
    entries: Vec<(String, Regex)>,
}

struct HeadingMatch {
    catalog_index: usize,
    start: usize,
    end: usize,
}

impl SectionCatalog {
    pub fn new(sections: &[SectionConfig]) -> Result<Self, regex::Error> {
        let entries = sections
            .iter()
            .map(|s| {
                let re = RegexBuilder::new(&s.pattern)
                    .case_insensitive(true)
                    .build()?;
                Ok((s.name.clone(), re))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { entries })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split `text` into named sections. Unmatched sections are omitted.
    pub fn extract(&self, text: &str) -> BTreeMap<String, String> {
        let headings: Vec<HeadingMatch> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(catalog_index, (_, re))| {
                re.find(text).map(|m| HeadingMatch {
                    catalog_index,
                    start: m.start(),
                    end: m.end(),
                })
            })
            .collect();

        let mut sections = BTreeMap::new();
        for heading in &headings {
            let boundary = headings
                .iter()
                .filter(|other| other.catalog_index != heading.catalog_index)
                .filter(|other| {
                    other.start > heading.start
                        || (other.start == heading.start
                            && other.catalog_index < heading.catalog_index)
                })
                .map(|other| other.start)
                .min();

            let content = match boundary {
                Some(end) if end <= heading.end => "",
                Some(end) => &text[heading.end..end],
                None => &text[heading.end..],
            };
            let name = &self.entries[heading.catalog_index].0;
            sections.insert(name.clone(), content.trim().to_string());
        }
        sections
    }
}
