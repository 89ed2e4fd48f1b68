//! The manuscript value handed to sinks.

use serde::{Deserialize, Serialize};

/// How a manuscript is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManuscriptStyle {
    /// Title, description, then the event passages.
    #[default]
    Novella,
    /// Like `Novella`, with a cast list before the passages.
    Script,
}

/// One line of a script's cast list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastEntry {
    pub name: String,
    pub short_description: Option<String>,
}

impl CastEntry {
    /// `"Name, short description"`, or just the name.
    pub fn line(&self) -> String {
        match self.short_description.as_deref() {
            Some(short) => format!("{}, {short}", self.name),
            None => self.name.clone(),
        }
    }
}

/// An ordered manuscript: the story header, an optional cast list and the
/// content of each chained event in structural order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manuscript {
    pub title: String,
    pub description: Option<String>,
    pub style: ManuscriptStyle,
    pub cast: Vec<CastEntry>,
    pub passages: Vec<String>,
}

impl Manuscript {
    /// Flatten into the paragraph sequence a sink receives.
    ///
    /// Passages containing blank lines are split so that every paragraph is a
    /// single block of text.
    pub fn paragraphs(&self) -> Vec<String> {
        let mut out = vec![self.title.clone()];
        if let Some(description) = &self.description {
            out.push(description.clone());
        }
        if self.style == ManuscriptStyle::Script {
            out.extend(self.cast.iter().map(CastEntry::line));
        }
        for passage in &self.passages {
            out.extend(split_blocks(passage));
        }
        out
    }
}

fn split_blocks(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_blocks_drops_empty_runs() {
        assert_eq!(split_blocks("a\n\nb\r\n\r\nc"), vec!["a", "b", "c"]);
        assert!(split_blocks("\n\n").is_empty());
    }

    #[test]
    fn cast_line_without_short_description() {
        let entry = CastEntry {
            name: "Ada".into(),
            short_description: None,
        };
        assert_eq!(entry.line(), "Ada");
    }
}
